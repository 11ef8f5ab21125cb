//! Non-blocking UDP endpoint for newline-framed JSON datagrams.

use std::io;
use std::net::{Ipv4Addr, SocketAddr, UdpSocket};

use credo_core::{Sba, credo_net, wire};
use serde_json::Value;

use crate::error::NetError;

/// Default receive buffer: one datagram, generously sized.
pub const DEFAULT_RECV_BUFFER_BYTES: usize = 65536;

/// Traffic counters for one endpoint.
#[derive(Clone, Copy, Debug, Default)]
pub struct EndpointStats {
    pub frames_sent: u64,
    pub frames_received: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub malformed_dropped: u64,
    pub send_errors: u64,
}

/// A loopback UDP socket speaking the mesh frame format.
///
/// The socket is non-blocking: [`UdpEndpoint::recv_frame`] returns
/// immediately with `None` when idle, which is what lets one thread poll
/// a component at a steady cadence.
pub struct UdpEndpoint {
    socket: UdpSocket,
    sba: Sba,
    buf: Vec<u8>,
    last_sender: Option<SocketAddr>,
    stats: EndpointStats,
}

impl UdpEndpoint {
    /// Bind on the loopback interface. Request sba 0 for an ephemeral
    /// port; [`UdpEndpoint::sba`] reports the port actually bound.
    pub fn bind(sba: Sba) -> Result<Self, NetError> {
        let socket = UdpSocket::bind((Ipv4Addr::LOCALHOST, sba))
            .map_err(|source| NetError::Bind { sba, source })?;
        socket
            .set_nonblocking(true)
            .map_err(|source| NetError::Bind { sba, source })?;
        let bound = socket
            .local_addr()
            .map_err(|source| NetError::Bind { sba, source })?
            .port();

        Ok(Self {
            socket,
            sba: bound,
            buf: vec![0u8; DEFAULT_RECV_BUFFER_BYTES],
            last_sender: None,
            stats: EndpointStats::default(),
        })
    }

    /// Port this endpoint is bound to.
    pub fn sba(&self) -> Sba {
        self.sba
    }

    pub fn stats(&self) -> &EndpointStats {
        &self.stats
    }

    /// Resize the single-datagram receive buffer.
    pub fn set_recv_buffer_bytes(&mut self, bytes: usize) {
        self.buf.resize(bytes.max(1), 0);
    }

    /// Send one frame to a loopback destination.
    pub fn send_frame(&mut self, value: &Value, dest: Sba) -> Result<(), NetError> {
        let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, dest));
        self.send_to(value, addr)
    }

    /// Send one frame to the sender of the most recent inbound datagram.
    pub fn reply_frame(&mut self, value: &Value) -> Result<(), NetError> {
        let Some(addr) = self.last_sender else {
            return Err(NetError::NoPeer);
        };
        self.send_to(value, addr)
    }

    fn send_to(&mut self, value: &Value, addr: SocketAddr) -> Result<(), NetError> {
        let frame = wire::encode_frame(value);
        match self.socket.send_to(&frame, addr) {
            Ok(wrote) if wrote == frame.len() => {
                self.stats.frames_sent += 1;
                self.stats.bytes_sent += wrote as u64;
                Ok(())
            }
            Ok(wrote) => {
                self.stats.send_errors += 1;
                Err(NetError::ShortWrite {
                    wrote,
                    frame_len: frame.len(),
                })
            }
            Err(source) => {
                self.stats.send_errors += 1;
                Err(NetError::Send { source })
            }
        }
    }

    /// One non-blocking receive. `None` when the socket is idle or the
    /// datagram is not a single JSON document.
    ///
    /// The sender is recorded before decoding, so a malformed datagram
    /// still redirects subsequent replies.
    pub fn recv_frame(&mut self) -> Option<Value> {
        let (len, sender) = match self.socket.recv_from(&mut self.buf) {
            Ok(received) => received,
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => return None,
            Err(err) => {
                credo_net!(trace, sba = self.sba, error = %err, "receive failed");
                return None;
            }
        };

        self.last_sender = Some(sender);
        self.stats.frames_received += 1;
        self.stats.bytes_received += len as u64;

        match wire::decode_frame(&self.buf[..len]) {
            Some(value) => Some(value),
            None => {
                self.stats.malformed_dropped += 1;
                credo_net!(trace, sba = self.sba, len, "malformed datagram dropped");
                None
            }
        }
    }
}

impl crate::ctx::Transport for UdpEndpoint {
    fn send(&mut self, value: &Value, dest: Sba) -> bool {
        match self.send_frame(value, dest) {
            Ok(()) => true,
            Err(err) => {
                credo_net!(debug, dest, error = %err, "frame send failed");
                false
            }
        }
    }

    fn reply(&mut self, value: &Value) -> bool {
        match self.reply_frame(value) {
            Ok(()) => true,
            Err(err) => {
                credo_net!(debug, error = %err, "frame reply failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread;
    use std::time::Duration;

    fn recv_with_retry(endpoint: &mut UdpEndpoint) -> Option<Value> {
        for _ in 0..100 {
            if let Some(value) = endpoint.recv_frame() {
                return Some(value);
            }
            thread::sleep(Duration::from_millis(2));
        }
        None
    }

    #[test]
    fn loopback_send_and_receive() {
        let mut tx = UdpEndpoint::bind(0).expect("bind sender");
        let mut rx = UdpEndpoint::bind(0).expect("bind receiver");

        let frame = json!({"verb": "GET", "resource": "beliefs"});
        tx.send_frame(&frame, rx.sba()).expect("send");

        let received = recv_with_retry(&mut rx).expect("frame delivered");
        assert_eq!(received, frame);
        assert_eq!(tx.stats().frames_sent, 1);
        assert_eq!(rx.stats().frames_received, 1);
    }

    #[test]
    fn reply_goes_to_last_sender() {
        let mut client = UdpEndpoint::bind(0).expect("bind client");
        let mut server = UdpEndpoint::bind(0).expect("bind server");

        client
            .send_frame(&json!({"verb": "GET"}), server.sba())
            .expect("send request");
        recv_with_retry(&mut server).expect("request delivered");

        server
            .reply_frame(&json!({"component": "BLS"}))
            .expect("reply");
        let reply = recv_with_retry(&mut client).expect("reply delivered");
        assert_eq!(reply["component"], "BLS");
    }

    #[test]
    fn reply_without_peer_fails() {
        let mut endpoint = UdpEndpoint::bind(0).expect("bind");
        let result = endpoint.reply_frame(&json!({}));
        assert!(matches!(result, Err(NetError::NoPeer)));
    }

    #[test]
    fn malformed_datagram_is_counted_and_dropped() {
        let mut rx = UdpEndpoint::bind(0).expect("bind receiver");
        let raw = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).expect("raw socket");
        raw.send_to(b"not json\n", (Ipv4Addr::LOCALHOST, rx.sba()))
            .expect("send garbage");

        for _ in 0..100 {
            rx.recv_frame();
            if rx.stats().malformed_dropped == 1 {
                break;
            }
            thread::sleep(Duration::from_millis(2));
        }
        assert_eq!(rx.stats().malformed_dropped, 1);
        assert_eq!(rx.stats().frames_received, 1);

        // The garbage sender still became the reply peer.
        assert!(rx.reply_frame(&json!({"ok": true})).is_ok());
    }

    #[test]
    fn bind_on_occupied_port_fails() {
        let first = UdpEndpoint::bind(0).expect("bind first");
        let second = UdpEndpoint::bind(first.sba());
        assert!(matches!(second, Err(NetError::Bind { .. })));
    }

    #[test]
    fn idle_socket_returns_none() {
        let mut endpoint = UdpEndpoint::bind(0).expect("bind");
        assert!(endpoint.recv_frame().is_none());
        assert_eq!(endpoint.stats().frames_received, 0);
    }
}
