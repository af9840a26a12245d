//! Global settings: `global_defs`, `static_ipaddress` and `static_routes`.

use crate::lens::Lens;
use crate::pattern::{block, comment_or_eol, field, flag, indent};

use super::{email, ipaddr, number, route, word};

/// One address per line inside `notification_email`, labeled `email`.
fn email_entry() -> Lens {
    Lens::subtree(Lens::seq([
        indent(),
        Lens::label("email"),
        email(),
        comment_or_eol(),
    ]))
}

fn global_defs() -> Lens {
    block(
        "global_defs",
        Lens::alt([
            block("notification_email", email_entry()),
            field("notification_email_from", email()),
            field("smtp_server", word()),
            field("smtp_connect_timeout", number()),
            field("lvs_id", word()),
            field("router_id", word()),
            flag("enable_traps"),
        ]),
    )
}

/// The global sub-grammar, one top-level construct per match.
#[must_use]
pub fn lens() -> Lens {
    Lens::alt([
        global_defs(),
        block("static_ipaddress", ipaddr()),
        block("static_routes", route()),
    ])
}
