//! Hot-path benchmarks for the topology directory.
//!
//! The directory sits on every packet send/receive decision, so the
//! interesting numbers are the read paths: peer lookup, canonical path
//! hit, and the policy scan.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use std::net::SocketAddr;
use std::sync::Arc;
use weft_topology::{Identity, InetPrefix, Peer, PhysicalPathConfig, Topology};

fn sock(s: &str) -> SocketAddr {
    s.parse().unwrap()
}

fn populated_topology() -> Topology {
    let topology = Topology::new(Identity::from_public_key([0xEE; 32]));
    for b in 1..=64u8 {
        topology.add_peer(Arc::new(Peer::new(Identity::from_public_key([b; 32]), 0)));
    }
    for i in 0..64u16 {
        let _ = topology.get_path(1, sock(&format!("203.0.113.{}:{}", i % 8 + 1, 9000 + i)));
    }
    let entries: Vec<_> = (0..16u32)
        .map(|i| PhysicalPathConfig {
            network: InetPrefix::new(format!("10.{i}.0.0").parse().unwrap(), 16).unwrap(),
            mtu: 1400,
            trusted_path_id: u64::from(i) + 1,
        })
        .collect();
    topology.set_physical_path_configuration(&entries).unwrap();
    topology
}

fn bench_peer_lookup(c: &mut Criterion) {
    let topology = populated_topology();
    let addr = Identity::from_public_key([32; 32]).address();
    c.bench_function("peer_get_hit", |b| {
        b.iter(|| black_box(topology.get_peer(black_box(addr))));
    });
}

fn bench_path_hit(c: &mut Criterion) {
    let topology = populated_topology();
    let remote = sock("203.0.113.1:9000");
    c.bench_function("path_get_hit", |b| {
        b.iter(|| black_box(topology.get_path(black_box(1), black_box(remote))));
    });
}

fn bench_policy_scan(c: &mut Criterion) {
    let topology = populated_topology();
    let last_match = sock("10.15.1.1:9993");
    let miss = sock("192.0.2.1:9993");
    c.bench_function("policy_scan_match", |b| {
        b.iter(|| black_box(topology.outbound_path_info(black_box(&last_match))));
    });
    c.bench_function("policy_scan_miss", |b| {
        b.iter(|| black_box(topology.outbound_path_trust(black_box(&miss))));
    });
}

criterion_group!(benches, bench_peer_lookup, bench_path_hit, bench_policy_scan);
criterion_main!(benches);
