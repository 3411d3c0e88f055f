use indexmap::IndexMap;
use macaddr::MacAddr6;
use uuid::{Uuid, uuid};

use crate::keti::{Channel, Reading};

/// Namespace used for channel identifiers when none is configured.
pub const DEFAULT_NAMESPACE: Uuid = uuid!("8d2f3c5e-52b1-5c0a-9b0e-4f6a1d7c2e90");

/// Stable identifier of one channel of one mote.
///
/// The name hashed into the UUID is the raw serial id followed by `-` and
/// the channel name, so the identifier survives node id reassignment.
pub fn channel_uuid(namespace: &Uuid, serial_id: &MacAddr6, channel: Channel) -> Uuid {
    let mut name = serial_id.as_bytes().to_vec();
    name.push(b'-');
    name.extend_from_slice(channel.name().as_bytes());

    Uuid::new_v5(namespace, &name)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeChannels {
    pub node_id: u16,

    pub serial_id: MacAddr6,

    pub channels: Vec<(Channel, Uuid)>,
}

impl NodeChannels {
    pub fn new(namespace: &Uuid, node_id: u16, serial_id: MacAddr6) -> Self {
        let channels = Channel::ALL
            .iter()
            .map(|&c| (c, channel_uuid(namespace, &serial_id, c)))
            .collect();

        Self {
            node_id,
            serial_id,
            channels,
        }
    }

    pub fn uuid(&self, channel: Channel) -> Option<Uuid> {
        self.channels
            .iter()
            .find(|(c, _)| *c == channel)
            .map(|(_, u)| *u)
    }

    pub fn part_number(&self) -> String {
        self.node_id.to_string()
    }

    /// Serial id as unpadded lowercase hex bytes joined by `:`, the form the
    /// archive has always used for `SerialNumber` metadata.
    pub fn serial_number(&self) -> String {
        self.serial_id
            .as_bytes()
            .iter()
            .map(|b| format!("{b:x}"))
            .collect::<Vec<_>>()
            .join(":")
    }
}

/// Nodes whose channels have been registered with the archive.
#[derive(Debug, Clone)]
pub struct ChannelRegistry {
    namespace: Uuid,
    nodes: IndexMap<u16, NodeChannels>,
}

impl ChannelRegistry {
    pub fn new(namespace: Uuid) -> Self {
        Self {
            namespace,
            nodes: IndexMap::new(),
        }
    }

    pub fn namespace(&self) -> &Uuid {
        &self.namespace
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Channels of the reading's node. `registered` is false on first sight
    /// of the node, or when it now reports a different serial id.
    pub fn resolve(&self, reading: &Reading) -> (NodeChannels, bool) {
        match self.nodes.get(&reading.node_id) {
            Some(node) if node.serial_id == reading.serial_id => (node.clone(), true),
            _ => (
                NodeChannels::new(&self.namespace, reading.node_id, reading.serial_id),
                false,
            ),
        }
    }

    pub fn mark_registered(&mut self, node: NodeChannels) {
        self.nodes.insert(node.node_id, node);
    }
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}
