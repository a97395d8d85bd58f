//! The Ethernet → IPv4 → TCP header walk.
//!
//! Fixed step order, no backtracking: a failure at any step is final for
//! the event and surfaces as a [`ParseSkip`], which every hook adapter
//! translates to its pass action (fail-open for malformed or irrelevant
//! traffic).

use portwarden_common::constants::{
    ETH_HDR_LEN, ETHERTYPE_IPV4, IPPROTO_TCP, IPV4_HDR_MIN_LEN, TCP_HDR_LEN,
};

use crate::frame::FrameView;

/// Offset of the EtherType field within the Ethernet header.
const ETHERTYPE_OFFSET: usize = 12;
/// Offset of the protocol field within the IPv4 header.
const IPV4_PROTOCOL_OFFSET: usize = 9;
/// Offset of the destination port within the TCP header.
const TCP_DEST_PORT_OFFSET: usize = 2;

/// Header fields extracted from a well-formed Ethernet+IPv4+TCP frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedHeaders {
    /// EtherType, host byte order. Always [`ETHERTYPE_IPV4`] on success.
    pub ethertype: u16,
    /// IPv4 protocol number. Always [`IPPROTO_TCP`] on success.
    pub ip_protocol: u8,
    /// IPv4 header length in bytes, `IHL × 4` (20–60 for sane frames).
    pub ip_header_len: u8,
    /// TCP destination port, converted to host byte order.
    pub tcp_dest_port: u16,
}

/// Why a frame was skipped rather than parsed.
///
/// Not an error: a skip means the frame is not subject to the policy, and
/// every hook forwards it unmodified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseSkip {
    /// The buffer is too short for the header being examined.
    Truncated,
    /// The EtherType is not IPv4; other protocols are never inspected.
    NotIpv4,
    /// The IPv4 payload is not TCP.
    NotTcp,
}

/// Walks `frame` and extracts the fields a policy decision needs.
///
/// Every dereference of a header-sized region is preceded by a length
/// check against the frame's extent; the [`FrameView`] impl additionally
/// bounds-checks each individual read. Work is constant per frame — no
/// loops, no retries.
#[inline(always)]
pub fn parse_frame<F: FrameView + ?Sized>(frame: &F) -> Result<ParsedHeaders, ParseSkip> {
    // Full Ethernet header present?
    if frame.frame_len() < ETH_HDR_LEN {
        return Err(ParseSkip::Truncated);
    }
    let ethertype = frame
        .read_u16_be(ETHERTYPE_OFFSET)
        .ok_or(ParseSkip::Truncated)?;
    if ethertype != ETHERTYPE_IPV4 {
        return Err(ParseSkip::NotIpv4);
    }

    // Full (minimal) IPv4 header present right after the Ethernet header?
    if frame.frame_len() < ETH_HDR_LEN + IPV4_HDR_MIN_LEN {
        return Err(ParseSkip::Truncated);
    }
    let version_ihl = frame.read_u8(ETH_HDR_LEN).ok_or(ParseSkip::Truncated)?;
    let ip_protocol = frame
        .read_u8(ETH_HDR_LEN + IPV4_PROTOCOL_OFFSET)
        .ok_or(ParseSkip::Truncated)?;
    if ip_protocol != IPPROTO_TCP {
        return Err(ParseSkip::NotTcp);
    }

    // IHL is in 32-bit words; options shift the TCP header accordingly.
    let ip_header_len = (version_ihl & 0x0f) * 4;

    // Full TCP header present at the computed offset?
    let tcp_offset = ETH_HDR_LEN + ip_header_len as usize;
    if frame.frame_len() < tcp_offset + TCP_HDR_LEN {
        return Err(ParseSkip::Truncated);
    }
    let tcp_dest_port = frame
        .read_u16_be(tcp_offset + TCP_DEST_PORT_OFFSET)
        .ok_or(ParseSkip::Truncated)?;

    Ok(ParsedHeaders {
        ethertype,
        ip_protocol,
        ip_header_len,
        tcp_dest_port,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds an Ethernet+IPv4+TCP frame with the given IHL (in 32-bit
    /// words) and destination port. Headers beyond the fields the parser
    /// reads are left zeroed.
    fn tcp_frame(ihl: u8, dst_port: u16) -> Vec<u8> {
        let ip_len = usize::from(ihl) * 4;
        let mut frame = vec![0u8; ETH_HDR_LEN + ip_len + TCP_HDR_LEN];
        frame[12..14].copy_from_slice(&ETHERTYPE_IPV4.to_be_bytes());
        frame[ETH_HDR_LEN] = 0x40 | ihl;
        frame[ETH_HDR_LEN + 9] = IPPROTO_TCP;
        let tcp = ETH_HDR_LEN + ip_len;
        frame[tcp + 2..tcp + 4].copy_from_slice(&dst_port.to_be_bytes());
        frame
    }

    #[test]
    fn empty_frame_is_truncated() {
        assert_eq!(parse_frame(&[] as &[u8]), Err(ParseSkip::Truncated));
    }

    #[test]
    fn frames_shorter_than_ethernet_are_truncated() {
        for len in 0..ETH_HDR_LEN {
            let frame = vec![0u8; len];
            assert_eq!(
                parse_frame(frame.as_slice()),
                Err(ParseSkip::Truncated),
                "length {len}"
            );
        }
    }

    #[test]
    fn arp_frame_is_not_ipv4() {
        let mut frame = vec![0u8; 64];
        frame[12..14].copy_from_slice(&0x0806u16.to_be_bytes());
        assert_eq!(parse_frame(frame.as_slice()), Err(ParseSkip::NotIpv4));
    }

    #[test]
    fn frames_shorter_than_ip_header_are_truncated() {
        for len in ETH_HDR_LEN..ETH_HDR_LEN + IPV4_HDR_MIN_LEN {
            let mut frame = vec![0u8; len];
            frame[12..14].copy_from_slice(&ETHERTYPE_IPV4.to_be_bytes());
            assert_eq!(
                parse_frame(frame.as_slice()),
                Err(ParseSkip::Truncated),
                "length {len}"
            );
        }
    }

    #[test]
    fn udp_frame_is_not_tcp() {
        let mut frame = tcp_frame(5, 53);
        frame[ETH_HDR_LEN + 9] = 17;
        assert_eq!(parse_frame(frame.as_slice()), Err(ParseSkip::NotTcp));
    }

    #[test]
    fn minimal_frame_extracts_destination_port() {
        let parsed = parse_frame(tcp_frame(5, 4040).as_slice()).expect("well-formed frame");
        assert_eq!(parsed.ethertype, ETHERTYPE_IPV4);
        assert_eq!(parsed.ip_protocol, IPPROTO_TCP);
        assert_eq!(parsed.ip_header_len, 20);
        assert_eq!(parsed.tcp_dest_port, 4040);
    }

    #[test]
    fn destination_port_is_converted_from_network_order() {
        // Port 0x1f90 (8080) sits on the wire as [0x1f, 0x90].
        let frame = tcp_frame(5, 8080);
        let tcp = ETH_HDR_LEN + 20;
        assert_eq!(&frame[tcp + 2..tcp + 4], &[0x1f, 0x90]);
        let parsed = parse_frame(frame.as_slice()).expect("well-formed frame");
        assert_eq!(parsed.tcp_dest_port, 8080);
    }

    #[test]
    fn ip_options_shift_the_tcp_header() {
        let parsed = parse_frame(tcp_frame(8, 443).as_slice()).expect("frame with options");
        assert_eq!(parsed.ip_header_len, 32);
        assert_eq!(parsed.tcp_dest_port, 443);
    }

    #[test]
    fn ihl_pushing_tcp_header_past_the_buffer_is_truncated() {
        // Claim fifteen words of IP header in a frame sized for five.
        let mut frame = tcp_frame(5, 4040);
        frame[ETH_HDR_LEN] = 0x4f;
        assert_eq!(parse_frame(frame.as_slice()), Err(ParseSkip::Truncated));
    }

    #[test]
    fn frame_truncated_inside_tcp_header_is_skipped() {
        let mut frame = tcp_frame(5, 4040);
        frame.truncate(ETH_HDR_LEN + 20 + TCP_HDR_LEN - 1);
        assert_eq!(parse_frame(frame.as_slice()), Err(ParseSkip::Truncated));
    }

    #[test]
    fn parsing_is_idempotent() {
        let frame = tcp_frame(6, 9000);
        let first = parse_frame(frame.as_slice());
        let second = parse_frame(frame.as_slice());
        assert_eq!(first, second);
    }
}
