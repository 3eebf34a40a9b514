pub mod packet;

use std::{env, time::Duration};

use packet::{Message, Question, RecordClass, RecordType, MAX_LEN, QUERY};
use tokio::{net::UdpSocket, time::Instant};
use tracing::{debug, info, trace};

const DEFAULT_TIMEOUT_MS: u64 = 5000;

pub async fn run(config: Config, name: &str, rtype: RecordType) -> anyhow::Result<()> {
    let mut response = lookup(&config, name, rtype).await?;
    println!("{}", response.dump());
    Ok(())
}

/// Sends a single recursion-desired query for `name` and waits for the
/// matching response. Datagrams from another address, carrying another ID
/// or too short to hold a header are skipped.
pub async fn lookup(config: &Config, name: &str, rtype: RecordType) -> anyhow::Result<Message> {
    let sock = UdpSocket::bind(&config.local_addr).await?;
    debug!("local socket is bound to {}", sock.local_addr()?);

    let id = rand::random::<u16>();
    let mut query = Message::new(id);
    query.set_opcode(QUERY);
    query.set_rd(true);
    query.add_question(&Question::new(name, rtype, RecordClass::IN))?;

    info!(
        "({:x?}) querying {} for {} {}",
        id, &config.server_addr, name, rtype
    );
    trace!("buf: {:x?}", query.get_used());
    let server = tokio::net::lookup_host(&config.server_addr)
        .await?
        .next()
        .ok_or_else(|| anyhow::anyhow!("{} does not resolve", &config.server_addr))?;
    sock.send_to(query.get_used(), server).await?;

    let deadline = Instant::now() + config.timeout;
    loop {
        let mut buf = [0u8; MAX_LEN];

        let (len, addr) = tokio::time::timeout_at(deadline, sock.recv_from(&mut buf))
            .await
            .map_err(|_| {
                anyhow::anyhow!(
                    "({:x?}) no response from {} within {:?}",
                    id,
                    &config.server_addr,
                    config.timeout
                )
            })??;
        trace!("buf: {:x?}", &buf[..len]);

        if addr != server {
            debug!("({:x?}) ignoring message from {}", id, addr);
            continue;
        }

        let mut response = match Message::from_received(&buf, len) {
            Ok(response) => response,
            Err(e) => {
                debug!("({:x?}) ignoring message from {}: {}", id, addr, e);
                continue;
            }
        };
        if response.get_id() != id || !response.get_qr() {
            debug!(
                "({:x?}) ignoring message {:x?} from {}",
                id,
                response.get_id(),
                addr
            );
            continue;
        }
        info!("({:x?}) response received from {}", id, addr);

        let sections = response.read_all()?;
        debug!(
            "({:x?}) {} answer(s), {} authority, {} additional",
            id,
            sections.answers.len(),
            sections.authorities.len(),
            sections.additionals.len()
        );

        return Ok(response);
    }
}

#[derive(Debug)]
pub struct Config {
    pub server_addr: String,
    pub local_addr: String,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Config {
        let timeout_ms = env::var("DNS_TIMEOUT_MS")
            .ok()
            .and_then(|ms| ms.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_MS);

        Config {
            server_addr: env::var("DNS_SERVER").unwrap_or("8.8.8.8:53".to_owned()),
            local_addr: env::var("LOCAL_ADDR").unwrap_or("0.0.0.0:0".to_owned()),
            timeout: Duration::from_millis(timeout_ms),
        }
    }
}
