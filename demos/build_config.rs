//! Build a keepalived.conf programmatically.

use keepalived_lens::{Node, Tree};

fn main() {
    let tree = Tree::new()
        .with(Node::comment("generated by build_config"))
        .with(Node::block(
            "global_defs",
            [
                Node::block("notification_email", [Node::new("email").with_value("ops@example.com")]),
                Node::field("notification_email_from", "lb@example.com"),
                Node::field("router_id", "LB_1"),
            ],
        ))
        .with(
            Node::vrrp_instance("VI_1", "MASTER", "eth0", 51)
                .with_child(Node::field("priority", "100"))
                .with_child(Node::block(
                    "virtual_ipaddress",
                    [Node::ipaddr("10.0.0.100", Some(24), Some("eth0"))],
                )),
        )
        .with(
            Node::virtual_server("10.0.0.100", 80).with_children([
                Node::field("lb_algo", "wrr"),
                Node::field("lb_kind", "DR"),
                Node::real_server("10.0.0.11", 80, 2),
                Node::real_server("10.0.0.12", 80, 1),
            ]),
        );

    let output = keepalived_lens::render(&tree, None).expect("render failed");
    print!("{output}");
}
