//! The keepalived.conf grammar.
//!
//! The top level is a repetition of blank lines, comments, and the three
//! sub-grammars, tried in that order at every position:
//!
//! 1. [`global`]: `global_defs`, `static_ipaddress`, `static_routes`
//! 2. [`vrrp`]: `vrrp_script`, `vrrp_sync_group`, `vrrp_instance`
//! 3. [`lvs`]: `virtual_server` and its `real_server`s
//!
//! The grammar is built once per process and shared read-only.

pub mod global;
pub mod lvs;
pub mod vrrp;

use std::sync::LazyLock;

use crate::lens::{Lens, Rx};
use crate::pattern::{self, comment, comment_or_eol, empty, indent, sep};

static GRAMMAR: LazyLock<Lens> = LazyLock::new(|| {
    Lens::star(Lens::alt([
        empty(),
        comment(),
        global::lens(),
        vrrp::lens(),
        lvs::lens(),
    ]))
});

/// The shared keepalived.conf lens.
#[must_use]
pub fn lens() -> &'static Lens {
    &GRAMMAR
}

const IPV4: &str = r"[0-9]{1,3}(?:\.[0-9]{1,3}){3}";
const IPV6: &str = r"[0-9A-Fa-f]{0,4}(?::[0-9A-Fa-f]{0,4}){2,7}";

pub(crate) fn number() -> Lens {
    Lens::store(Rx::new("number", "[0-9]+"))
}

pub(crate) fn signed() -> Lens {
    Lens::store(Rx::new("integer", "-?[0-9]+"))
}

/// Whole or fractional seconds.
pub(crate) fn seconds() -> Lens {
    Lens::store(Rx::new("seconds", r"[0-9]+(?:\.[0-9]+)?"))
}

pub(crate) fn ip() -> Rx {
    Rx::new("ip address", &format!("{IPV4}|{IPV6}"))
}

pub(crate) fn address() -> Lens {
    Lens::store(ip())
}

pub(crate) fn word() -> Lens {
    Lens::store(pattern::word())
}

/// Any run of non-blank characters: passwords, URL paths, digests.
pub(crate) fn token() -> Lens {
    Lens::store(Rx::new("token", r"[^ \t\r\n]+"))
}

pub(crate) fn email() -> Lens {
    Lens::store(Rx::new("email address", r"[A-Za-z0-9_.+-]+@[A-Za-z0-9_.-]+"))
}

/// A script path, bare or double-quoted. Quotes stay part of the value.
pub(crate) fn script() -> Lens {
    Lens::store(Rx::new("script", r#""[^"\r\n]*"|[^ \t\r\n#!"]+"#))
}

/// `/len` after an address, as a `prefixlen` child.
fn prefixlen() -> Lens {
    Lens::opt(Lens::subtree(Lens::seq([
        Lens::label("prefixlen"),
        Lens::del_str("/"),
        number(),
    ])))
}

/// `keyword value` pairs trailing an entry line, each as a child node.
fn options(keywords: &str) -> Lens {
    Lens::star(Lens::seq([
        sep(),
        Lens::subtree(Lens::seq([
            Lens::key(Rx::new("option keyword", keywords)),
            sep(),
            word(),
        ])),
    ]))
}

/// `192.168.1.1/24 dev eth0`: an `ipaddr` node valued with the address,
/// with `prefixlen`, `dev`, `brd`, `scope` and `label` children.
pub(crate) fn ipaddr() -> Lens {
    Lens::subtree(Lens::seq([
        indent(),
        Lens::label("ipaddr"),
        address(),
        prefixlen(),
        options("dev|brd|scope|label"),
        comment_or_eol(),
    ]))
}

/// `src 192.168.1.1 to 10.0.0.0/8 dev eth0`: a `route` node with `src`,
/// `to` (carrying an optional `prefixlen`), and option children.
pub(crate) fn route() -> Lens {
    Lens::subtree(Lens::seq([
        indent(),
        Lens::label("route"),
        Lens::subtree(Lens::seq([Lens::key_str("src"), sep(), address()])),
        sep(),
        Lens::subtree(Lens::seq([
            Lens::key_str("to"),
            sep(),
            address(),
            prefixlen(),
        ])),
        options("via|gw|dev|scope|table|metric"),
        comment_or_eol(),
    ]))
}

/// A bare name on its own line, used as the node's label.
pub(crate) fn member() -> Lens {
    Lens::subtree(Lens::seq([
        indent(),
        Lens::key(pattern::word()),
        comment_or_eol(),
    ]))
}
