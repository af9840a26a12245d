#![allow(dead_code)]

use keepalived_lens::{Tree, parse, render};

/// A representative file touching every sub-grammar.
pub const SAMPLE: &str = "\
! Configuration File for keepalived

global_defs {
   notification_email {
     acassen@firewall.loc
     failover@firewall.loc
   }
   notification_email_from Alexandre.Cassen@firewall.loc
   smtp_server 192.168.200.1
   smtp_connect_timeout 30
   router_id LVS_DEVEL
}

vrrp_sync_group VG_1 {
   group {
     VI_1
   }
}

vrrp_instance VI_1 {
    state MASTER
    interface eth0
    virtual_router_id 51
    priority 100   # highest wins
    advert_int 1
    nopreempt
    authentication {
        auth_type PASS
        auth_pass 1111
    }
    virtual_ipaddress {
        192.168.200.16/24 dev eth0
        192.168.200.17
    }
}

# maintenance window
virtual_server 10.10.10.2 1358 {
    delay_loop 6
    lb_algo rr
    lb_kind NAT
    nat_mask 255.255.255.0
    protocol TCP

    real_server 192.168.200.2 1358 {
        weight 1
        TCP_CHECK {
            connect_timeout 3
            connect_port 1358
        }
    }
}
";

pub fn roundtrip(input: &str) {
    let tree = parse(input).expect("parse failed");
    let output = render(&tree, Some(input)).expect("render failed");
    assert_eq!(
        output, input,
        "round-trip mismatch:\n--- expected ---\n{input}\n--- got ---\n{output}"
    );
}

/// Render a tree, parse it back, assert the trees are equal.
pub fn assert_tree_roundtrip(tree: &Tree, original: Option<&str>) -> String {
    let rendered = render(tree, original).expect("render failed");
    let reparsed = parse(&rendered).unwrap_or_else(|e| {
        panic!(
            "failed to re-parse rendered output: {e}\n\
             --- rendered ---\n{rendered}"
        )
    });
    assert_eq!(
        &reparsed, tree,
        "tree mismatch\n--- rendered ---\n{rendered}"
    );
    rendered
}
