//! Demonstrate error handling for invalid keepalived.conf input and for
//! trees the grammar cannot render.

use keepalived_lens::{Error, Node, Tree};

fn main() {
    // Misspelled keyword inside a block
    match keepalived_lens::parse("vrrp_instance VI_1 {\n  priorty 100\n}\n") {
        Ok(_) => println!("Parsed OK (unexpected)"),
        Err(e) => {
            println!("Parse error: {e}");
            println!("  Kind: {:?}", e.kind);
            println!("  Location: line {}, column {}", e.span.line, e.span.column);
        }
    }

    println!();

    // Unclosed brace
    match keepalived_lens::parse("global_defs {\n  router_id lb1\n") {
        Ok(_) => println!("Parsed OK (unexpected)"),
        Err(e) => {
            println!("Parse error: {e}");
            println!("  Expected: {}", e.kind.expected().join(", "));
        }
    }

    println!();

    // A node the grammar has no place for
    let tree = Tree::new().with(Node::block("global_defs", [Node::field("hostname", "lb1")]));
    match keepalived_lens::render(&tree, None) {
        Ok(_) => println!("Rendered OK (unexpected)"),
        Err(Error::Parse(e)) => println!("Parse error: {e}"),
        Err(Error::Structure(e)) => {
            println!("Structural error: {e}");
            println!("  Path: {}", e.path);
        }
    }
}
