use crate::config::RingConfig;
use crate::node::{Node, NodeSettings};
use crate::ring::{Disposition, RingTransport};
use anyhow::Context;
use copas_bot::Strategy;
use copas_core::model::node::NodeId;
use copas_proto::{Frame, Message, MsgKind};
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

/// Bind the socket, run the event loop until the game ends. The loop is
/// the only mutator of node state: receive, process locally, forward,
/// transmit whatever the node originated.
pub fn run(
    config: &RingConfig,
    self_id: NodeId,
    strategy: Box<dyn Strategy>,
) -> anyhow::Result<()> {
    let listen = config.listen_addr(self_id)?;
    let successor = config.successor_addr(self_id)?;
    let mut transport = RingTransport::bind(self_id, listen, successor)
        .with_context(|| format!("binding udp socket on {listen}"))?;

    let settings = NodeSettings {
        score_limit: config.game.score_limit,
        seed: config.game.seed,
    };
    let mut node = Node::new(self_id, strategy, settings);
    let pace = Duration::from_millis(config.game.pace_ms);

    if self_id.is_coordinator() {
        // Give the other three processes a moment to bind before the first
        // broadcast enters the ring.
        let grace = Duration::from_millis(config.game.start_grace_ms);
        info!(%self_id, ?grace, "waiting before GAME_START");
        thread::sleep(grace);
        send_all(&transport, node.start(), pace)?;
    }

    while !node.finished() {
        let Some(received) = transport.recv().context("receiving from the ring")? else {
            continue;
        };

        let header = received.frame.header;
        let out = match received.disposition {
            Disposition::Lap => node.handle_lap(header),
            Disposition::DeliverAndForward => {
                match Message::decode(header.kind, &received.frame.payload) {
                    Ok(message) => node.handle(header, message),
                    Err(err) => {
                        // Header was sound, payload was not: skip locally,
                        // let the rest of the ring judge for itself.
                        debug!(kind = %header.kind, %err, "dropping undecodable payload");
                        Vec::new()
                    }
                }
            }
            Disposition::ForwardOnly => Vec::new(),
        };

        // Local processing strictly precedes forwarding.
        if received.disposition != Disposition::Lap {
            transport
                .forward(&received.raw)
                .context("forwarding to successor")?;
        }

        send_all(&transport, out, pace)?;
    }

    info!(%self_id, "leaving the ring");
    Ok(())
}

fn send_all(transport: &RingTransport, frames: Vec<Frame>, pace: Duration) -> anyhow::Result<()> {
    for frame in frames {
        if !pace.is_zero() && frame.header.kind == MsgKind::TokenPass {
            thread::sleep(pace);
        }
        transport
            .send(&frame)
            .with_context(|| format!("sending {}", frame.header.kind))?;
    }
    Ok(())
}
