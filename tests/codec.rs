use std::net::Ipv4Addr;

use mini_dns_wire::packet::{
    Error, GenericData, Message, Question, RData, RecordClass, RecordType, ResourceRecord,
    Section, HEADER_LEN,
};

fn example_question() -> Question {
    Question::new("example.com", RecordType::A, RecordClass::IN)
}

fn a_record(name: &str, addr: Ipv4Addr) -> ResourceRecord {
    ResourceRecord::new(name, RecordClass::IN, 3600, RData::A(addr))
}

#[test]
fn query_scenario() {
    let mut query = Message::new(0x1234);
    query.set_qr(false);
    query.set_rd(true);
    query.add_question(&example_question()).unwrap();

    let bytes = query.get_used().to_vec();
    let mut decoded = Message::from_received(&bytes, bytes.len()).unwrap();
    assert_eq!(decoded.get_id(), 0x1234);
    assert!(!decoded.get_qr());
    assert!(decoded.get_rd());
    assert_eq!(decoded.get_qdcount(), 1);
    assert_eq!(decoded.get_question().unwrap().name, "example.com");
}

#[test]
fn repeated_owner_name_is_compressed() {
    let first = a_record("example.com", Ipv4Addr::new(192, 0, 2, 1));
    let second = a_record("example.com", Ipv4Addr::new(192, 0, 2, 2));

    let mut msg = Message::new(1);
    msg.add_resource_record(&first, Section::Answer).unwrap();
    msg.add_resource_record(&second, Section::Answer).unwrap();

    // uncompressed, each record is 13 + 10 + 4 bytes
    let used = msg.get_used().to_vec();
    assert_eq!(used.len(), HEADER_LEN + 27 + 16);
    assert!(used.len() < HEADER_LEN + 2 * 27);
    assert_eq!(&used[HEADER_LEN + 27..HEADER_LEN + 29], &[0xc0, 0x0c]);

    let mut decoded = Message::from_received(&used, used.len()).unwrap();
    let sections = decoded.read_all().unwrap();
    assert_eq!(sections.answers, vec![first, second]);
    assert_eq!(sections.answers[0].name(), sections.answers[1].name());
}

#[test]
fn repeated_question_name_is_compressed() {
    let mut msg = Message::new(1);
    msg.add_question(&example_question()).unwrap();
    msg.add_question(&Question::new("example.com", RecordType::AAAA, RecordClass::IN))
        .unwrap();
    assert_eq!(msg.get_used().len(), HEADER_LEN + 17 + 6);

    let sections = msg.read_all().unwrap();
    assert_eq!(sections.questions[0].name, sections.questions[1].name);
    assert_eq!(sections.questions[1].rtype, RecordType::AAAA);
}

#[test]
fn truncated_aaaa_is_an_error() {
    let rr = ResourceRecord::new(
        "v6.example",
        RecordClass::IN,
        60,
        RData::Aaaa("2001:db8::1".parse().unwrap()),
    );
    let mut msg = Message::new(9);
    msg.add_resource_record(&rr, Section::Answer).unwrap();

    let used = msg.get_used();
    let short = &used[..used.len() - 2];
    let mut decoded = Message::from_received(short, short.len()).unwrap();
    assert!(matches!(decoded.get_rr(), Err(Error::Truncated { .. })));
}

#[test]
fn counts_follow_content() {
    let mut msg = Message::new(0);
    for _ in 0..3 {
        msg.add_question(&example_question()).unwrap();
    }
    let rr = a_record("example.com", Ipv4Addr::LOCALHOST);
    for _ in 0..4 {
        msg.add_resource_record(&rr, "answer".parse().unwrap()).unwrap();
    }
    assert_eq!(msg.get_qdcount(), 3);
    assert_eq!(msg.get_ancount(), 4);
    assert_eq!(msg.get_nscount(), 0);
    assert_eq!(msg.get_arcount(), 0);
}

// A response as a resolver would send it: the answer owners and the NS
// targets all point back into earlier names.
const RESPONSE: &[u8] = b"\xab\xcd\x81\x80\x00\x01\x00\x02\x00\x01\x00\x01\
\x03www\x07example\x03com\x00\x00\x01\x00\x01\
\xc0\x0c\x00\x05\x00\x01\x00\x00\x0e\x10\x00\x02\xc0\x10\
\xc0\x10\x00\x01\x00\x01\x00\x00\x0e\x10\x00\x04\x5d\xb8\xd8\x22\
\xc0\x10\x00\x02\x00\x01\x00\x01\x51\x80\x00\x06\x03ns1\xc0\x10\
\xc0\x4b\x00\x01\x00\x01\x00\x01\x51\x80\x00\x04\xc0\x00\x02\x35";

#[test]
fn decoded_response_reencodes_identically() {
    let mut received = Message::from_received(RESPONSE, RESPONSE.len()).unwrap();
    let sections = received.read_all().unwrap();
    assert_eq!(received.position(), RESPONSE.len());

    assert_eq!(sections.questions[0].name, "www.example.com");
    assert_eq!(
        sections.answers[0].rdata(),
        &RData::Generic(GenericData::name(RecordType::CNAME, "example.com").unwrap())
    );
    assert_eq!(
        sections.answers[1].rdata(),
        &RData::A(Ipv4Addr::new(93, 184, 216, 34))
    );
    assert_eq!(sections.authorities[0].to_string(), "example.com 86400 IN NS ns1.example.com");
    assert_eq!(sections.additionals[0].name(), "ns1.example.com");

    let mut rebuilt = Message::new(received.get_id());
    rebuilt.set_qr(received.get_qr());
    rebuilt.set_opcode(received.get_opcode());
    rebuilt.set_aa(received.get_aa());
    rebuilt.set_tc(received.get_tc());
    rebuilt.set_rd(received.get_rd());
    rebuilt.set_ra(received.get_ra());
    rebuilt.set_rcode(received.get_rcode());
    for question in &sections.questions {
        rebuilt.add_question(question).unwrap();
    }
    for (records, section) in [
        (&sections.answers, Section::Answer),
        (&sections.authorities, Section::NameServer),
        (&sections.additionals, Section::Additional),
    ] {
        for rr in records {
            rebuilt.add_resource_record(rr, section).unwrap();
        }
    }

    assert_eq!(rebuilt.get_used(), RESPONSE);
}

#[test]
fn dump_of_a_response() {
    let received = Message::from_received(RESPONSE, RESPONSE.len()).unwrap();
    let dump = received.to_string();
    assert!(dump.starts_with("ID: 43981 QR: true OP: 0 AA: false\n"));
    assert!(dump.contains("TC: false RD: true RA: true RCODE: 0 No error\n"));
    assert!(dump.contains("QDCount: 1 ANCount: 2 NSCount: 1 ARCount: 1\n"));
    assert!(dump.contains("[0] www.example.com 3600 IN CNAME example.com\n"));
    assert!(dump.contains("Additional [1]\n[0] ns1.example.com 86400 IN A 192.0.2.53\n"));
}

#[test]
fn label_with_invalid_utf8_still_decodes() {
    let bytes = b"\x00\x07\x01\x00\x00\x01\x00\x00\x00\x00\x00\x00\
\x01\xff\x03com\x00\x00\x01\x00\x01";
    let mut received = Message::from_received(bytes, bytes.len()).unwrap();

    let sections = received.read_all().unwrap();
    assert_eq!(sections.questions[0].name, "\u{fffd}.com");
    assert_eq!(sections.questions[0].rtype, RecordType::A);
    assert_eq!(received.position(), bytes.len());
}
