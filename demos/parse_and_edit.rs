//! Parse a keepalived.conf string, edit it, and write it back with the
//! original layout intact.

use keepalived_lens::Node;

fn main() {
    let input = "\
! Configuration File for keepalived

vrrp_instance VI_1 {
    state MASTER
    interface eth0
    virtual_router_id 51
    priority 100        # highest wins
    virtual_ipaddress {
        192.168.1.1/24 dev eth0
    }
}
";

    let mut tree = keepalived_lens::parse(input).expect("parse failed");

    println!("Tree:\n{tree}");
    for addr in tree.select("vrrp_instance/virtual_ipaddress/ipaddr") {
        println!("  VIP: {}", addr.value().unwrap_or_default());
    }

    let instance = tree.get_mut("vrrp_instance").expect("no vrrp_instance");
    instance.set_value("VI_PRIMARY");
    if let Some(priority) = instance.child_mut("priority") {
        priority.set_value("150");
    }
    instance
        .child_mut("virtual_ipaddress")
        .expect("no virtual_ipaddress")
        .push(Node::ipaddr("192.168.1.2", Some(24), Some("eth0")));

    let output = keepalived_lens::render(&tree, Some(input)).expect("render failed");
    println!("\nEdited output:\n{output}");
}
