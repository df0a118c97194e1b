//! Property-based tests for matching and key semantics.

use proptest::prelude::*;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use weft_topology::{InetPrefix, PathKey, PhysicalPathConfig, PhysicalPathPolicy};

fn arb_ipv4() -> impl Strategy<Value = Ipv4Addr> {
    any::<u32>().prop_map(Ipv4Addr::from)
}

fn arb_ipv6() -> impl Strategy<Value = Ipv6Addr> {
    any::<u128>().prop_map(Ipv6Addr::from)
}

proptest! {
    /// Any address is contained in every prefix cut from itself.
    #[test]
    fn prop_v4_address_contained_in_own_prefixes(ip in arb_ipv4(), len in 0u8..=32) {
        let prefix = InetPrefix::new(IpAddr::V4(ip), len).unwrap();
        prop_assert!(prefix.contains(IpAddr::V4(ip)));
    }

    #[test]
    fn prop_v6_address_contained_in_own_prefixes(ip in arb_ipv6(), len in 0u8..=128) {
        let prefix = InetPrefix::new(IpAddr::V6(ip), len).unwrap();
        prop_assert!(prefix.contains(IpAddr::V6(ip)));
    }

    /// Flipping a bit above the prefix boundary breaks containment;
    /// flipping one below it never does.
    #[test]
    fn prop_v4_prefix_boundary(ip in arb_ipv4(), len in 1u8..=32, bit in 0u8..32) {
        let prefix = InetPrefix::new(IpAddr::V4(ip), len).unwrap();
        let flipped = Ipv4Addr::from(u32::from(ip) ^ (1u32 << (31 - bit)));
        if bit < len {
            prop_assert!(!prefix.contains(IpAddr::V4(flipped)));
        } else {
            prop_assert!(prefix.contains(IpAddr::V4(flipped)));
        }
    }

    /// Family mismatch is never a match, whatever the prefix.
    #[test]
    fn prop_family_mismatch(v4 in arb_ipv4(), v6 in arb_ipv6(), len in 0u8..=32) {
        let prefix = InetPrefix::new(IpAddr::V4(v4), len).unwrap();
        prop_assert!(!prefix.contains(IpAddr::V6(v6)));
    }

    /// Path keys are equal exactly when both components are equal.
    #[test]
    fn prop_path_key_equality(
        l1 in any::<i64>(), l2 in any::<i64>(),
        ip1 in arb_ipv4(), ip2 in arb_ipv4(),
        p1 in 1u16.., p2 in 1u16..,
    ) {
        let r1 = SocketAddr::new(IpAddr::V4(ip1), p1);
        let r2 = SocketAddr::new(IpAddr::V4(ip2), p2);
        let equal = l1 == l2 && r1 == r2;
        prop_assert_eq!(PathKey::new(l1, r1) == PathKey::new(l2, r2), equal);
    }

    /// The policy always honors the earliest matching entry.
    #[test]
    fn prop_first_match_precedence(
        nets in proptest::collection::vec((arb_ipv4(), 0u8..=32, 576u32..=9000, 1u64..=64), 1..=16),
        probe in arb_ipv4(),
    ) {
        let entries: Vec<PhysicalPathConfig> = nets
            .iter()
            .map(|(ip, len, mtu, id)| PhysicalPathConfig {
                network: InetPrefix::new(IpAddr::V4(*ip), *len).unwrap(),
                mtu: *mtu,
                trusted_path_id: *id,
            })
            .collect();
        let policy = PhysicalPathPolicy::new();
        policy.set_configuration(&entries).unwrap();

        let addr = SocketAddr::new(IpAddr::V4(probe), 9993);
        let expected = entries
            .iter()
            .find(|e| e.network.contains(IpAddr::V4(probe)))
            .map(|e| (e.mtu, e.trusted_path_id));
        let got = policy
            .outbound_path_info(&addr)
            .map(|i| (i.mtu, i.trusted_path_id));
        prop_assert_eq!(got, expected);
    }
}
