//! TCP reachability probe.

use std::fmt;
use std::future::Future;
use std::io;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time;

/// A `host:port` pair to probe.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// One connection attempt against an endpoint.
pub trait Probe {
    /// Resolves to `Ok(())` if the endpoint accepted a connection.
    fn connect(&self, endpoint: &Endpoint) -> impl Future<Output = io::Result<()>> + Send;
}

/// Opens a TCP connection and closes it immediately.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    connect_timeout: Duration,
}

impl TcpProbe {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Probe for TcpProbe {
    async fn connect(&self, endpoint: &Endpoint) -> io::Result<()> {
        let attempt = TcpStream::connect((endpoint.host.as_str(), endpoint.port));
        match time::timeout(self.connect_timeout, attempt).await {
            Ok(Ok(stream)) => {
                drop(stream);
                Ok(())
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("no answer within {:?}", self.connect_timeout),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn connects_to_listening_socket() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let probe = TcpProbe::new(Duration::from_secs(1));
        probe
            .connect(&Endpoint::new("127.0.0.1", port))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn closed_port_is_an_error() {
        // Bind then drop to obtain a port nobody listens on.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };

        let probe = TcpProbe::new(Duration::from_secs(1));
        assert!(probe
            .connect(&Endpoint::new("127.0.0.1", port))
            .await
            .is_err());
    }

    #[test]
    fn endpoint_displays_as_host_port() {
        assert_eq!(Endpoint::new("db", 3306).to_string(), "db:3306");
    }
}
