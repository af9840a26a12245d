use crate::tree::{COMMENT, Node, Tree};

impl Node {
    /// Set the value.
    #[must_use]
    pub fn with_value(mut self, value: &str) -> Self {
        self.set_value(value);
        self
    }

    /// Append a child.
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.push(child);
        self
    }

    /// Append several children in order.
    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.children_mut().extend(children);
        self
    }

    /// A `#comment` node holding `text`, without the marker.
    #[must_use]
    pub fn comment(text: &str) -> Self {
        Self::new(COMMENT).with_value(text)
    }

    /// A `keyword value` line.
    #[must_use]
    pub fn field(keyword: &str, value: &str) -> Self {
        Self::new(keyword).with_value(value)
    }

    /// A bare `keyword` line.
    #[must_use]
    pub fn flag(keyword: &str) -> Self {
        Self::new(keyword)
    }

    /// A `keyword { ... }` block with the given body.
    #[must_use]
    pub fn block(keyword: &str, body: impl IntoIterator<Item = Self>) -> Self {
        Self::new(keyword).with_children(body)
    }

    /// A `keyword name { ... }` block.
    #[must_use]
    pub fn named_block(keyword: &str, name: &str, body: impl IntoIterator<Item = Self>) -> Self {
        Self::block(keyword, body).with_value(name)
    }

    /// A `keyword ip port { ... }` block; `ip` and `port` come first.
    #[must_use]
    pub fn named_block_arg(
        keyword: &str,
        (name_label, name): (&str, &str),
        (arg_label, arg): (&str, &str),
        body: impl IntoIterator<Item = Self>,
    ) -> Self {
        Self::new(keyword)
            .with_child(Self::field(name_label, name))
            .with_child(Self::field(arg_label, arg))
            .with_children(body)
    }

    /// An `ipaddr` entry: `addr[/prefixlen] [dev dev]`.
    #[must_use]
    pub fn ipaddr(addr: &str, prefixlen: Option<u8>, dev: Option<&str>) -> Self {
        let mut node = Self::new("ipaddr").with_value(addr);
        if let Some(len) = prefixlen {
            node.push(Self::field("prefixlen", &len.to_string()));
        }
        if let Some(dev) = dev {
            node.push(Self::field("dev", dev));
        }
        node
    }

    /// A `vrrp_instance` block with the usual leading fields.
    #[must_use]
    pub fn vrrp_instance(name: &str, state: &str, interface: &str, router_id: u8) -> Self {
        Self::named_block(
            "vrrp_instance",
            name,
            [
                Self::field("state", state),
                Self::field("interface", interface),
                Self::field("virtual_router_id", &router_id.to_string()),
            ],
        )
    }

    /// A `virtual_server ip port` block.
    #[must_use]
    pub fn virtual_server(ip: &str, port: u16) -> Self {
        Self::named_block_arg("virtual_server", ("ip", ip), ("port", &port.to_string()), [])
    }

    /// A `real_server ip port` block with a weight.
    #[must_use]
    pub fn real_server(ip: &str, port: u16, weight: u32) -> Self {
        Self::named_block_arg(
            "real_server",
            ("ip", ip),
            ("port", &port.to_string()),
            [Self::field("weight", &weight.to_string())],
        )
    }
}

impl Tree {
    /// Append a top-level node.
    #[must_use]
    pub fn with(mut self, node: Node) -> Self {
        self.push(node);
        self
    }
}
