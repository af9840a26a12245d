//! Load-balancing settings: `virtual_server` and the `real_server`s behind
//! it, with their health checkers.

use crate::lens::Lens;
use crate::pattern::{block, field, flag, named_block_arg, positional, sep};

use super::{address, number, script, token, word};

fn retry_fields() -> [Lens; 4] {
    [
        field("connect_timeout", number()),
        field("connect_port", number()),
        field("nb_get_retry", number()),
        field("delay_before_retry", number()),
    ]
}

fn tcp_check() -> Lens {
    block("TCP_CHECK", Lens::alt(retry_fields()))
}

/// `HTTP_GET` or `SSL_GET`: `url` blocks plus the retry fields.
fn http_check(keyword: &str) -> Lens {
    let url = block(
        "url",
        Lens::alt([
            field("path", token()),
            field("digest", word()),
            field("status_code", number()),
        ]),
    );
    block(keyword, Lens::alt([url].into_iter().chain(retry_fields())))
}

fn real_server() -> Lens {
    named_block_arg(
        "real_server",
        "ip",
        "port",
        Lens::alt([
            field("weight", number()),
            flag("inhibit_on_failure"),
            field("notify_up", script()),
            field("notify_down", script()),
            tcp_check(),
            http_check("HTTP_GET"),
            http_check("SSL_GET"),
        ]),
    )
}

fn virtual_server() -> Lens {
    named_block_arg(
        "virtual_server",
        "ip",
        "port",
        Lens::alt([
            field("delay_loop", number()),
            field("lb_algo", word()),
            field("lb_kind", word()),
            field("nat_mask", address()),
            field("protocol", word()),
            field("persistence_timeout", number()),
            flag("ha_suspend"),
            field(
                "sorry_server",
                Lens::seq([positional("ip"), sep(), positional("port")]),
            ),
            real_server(),
        ]),
    )
}

/// The load-balancing sub-grammar.
#[must_use]
pub fn lens() -> Lens {
    virtual_server()
}
