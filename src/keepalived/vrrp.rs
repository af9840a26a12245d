//! VRRP settings: `vrrp_script`, `vrrp_sync_group` and `vrrp_instance`.

use crate::lens::Lens;
use crate::pattern::{self, block, comment_or_eol, field, flag, indent, named_block, sep};

use super::{address, ipaddr, member, number, route, script, seconds, signed, token, word};

const NOTIFY: [&str; 4] = ["notify_master", "notify_backup", "notify_fault", "notify"];

fn notify_fields() -> impl Iterator<Item = Lens> {
    NOTIFY.into_iter().map(|keyword| field(keyword, script()))
}

/// `vrrp_script chk_name { script ... }`
fn vrrp_script() -> Lens {
    named_block(
        "vrrp_script",
        Lens::alt([
            field("script", script()),
            field("interval", seconds()),
            field("timeout", seconds()),
            field("weight", signed()),
            field("fall", number()),
            field("rise", number()),
        ]),
    )
}

fn vrrp_sync_group() -> Lens {
    let body = [block("group", member()), flag("smtp_alert")]
        .into_iter()
        .chain(notify_fields());
    named_block("vrrp_sync_group", Lens::alt(body))
}

/// A tracked interface or script: the name as label, optionally followed
/// by `weight N` as a child.
fn tracked() -> Lens {
    Lens::subtree(Lens::seq([
        indent(),
        Lens::key(pattern::word()),
        Lens::opt(Lens::seq([
            sep(),
            Lens::subtree(Lens::seq([Lens::key_str("weight"), sep(), signed()])),
        ])),
        comment_or_eol(),
    ]))
}

fn vrrp_instance() -> Lens {
    let fields = [
        field("state", word()),
        field("interface", word()),
        field("lvs_sync_daemon_interface", word()),
        field("virtual_router_id", number()),
        field("priority", number()),
        field("advert_int", seconds()),
        field("mcast_src_ip", address()),
        field("garp_master_delay", number()),
        field("preempt_delay", number()),
        flag("smtp_alert"),
        flag("nopreempt"),
        flag("dont_track_primary"),
        block(
            "authentication",
            Lens::alt([field("auth_type", word()), field("auth_pass", token())]),
        ),
        block("virtual_ipaddress", ipaddr()),
        block("virtual_routes", route()),
        block("track_interface", tracked()),
        block("track_script", tracked()),
    ];
    named_block(
        "vrrp_instance",
        Lens::alt(fields.into_iter().chain(notify_fields())),
    )
}

/// The VRRP sub-grammar, one top-level construct per match.
#[must_use]
pub fn lens() -> Lens {
    Lens::alt([vrrp_script(), vrrp_sync_group(), vrrp_instance()])
}
