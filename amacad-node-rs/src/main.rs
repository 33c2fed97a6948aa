//! AMACAD Node
//!
//! Runs one clustering node over UDP.

use amacad_core::{
    ClusterConfig, ClusterNode, Destination, DestinationSchedule, Effect, StaticMobility, Transport, Vec2,
};
use clap::Parser;
use std::io::{self, BufRead};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// AMACAD vehicular clustering node
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Numeric node identifier
    #[arg(short, long)]
    id: u32,

    /// UDP port to listen on
    #[arg(short, long, default_value_t = amacad_core::transport::DEFAULT_PORT)]
    port: u16,

    /// IP address other nodes use to reach this one
    #[arg(long, default_value = "127.0.0.1")]
    advertise: IpAddr,

    /// Peer address for broadcast fan-out (repeatable); without peers,
    /// broadcasts go to 255.255.255.255
    #[arg(long = "peer")]
    peers: Vec<SocketAddr>,

    /// Initial position
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    x: f64,

    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    y: f64,

    /// Initial speed
    #[arg(long, default_value_t = 0.0)]
    speed: f64,

    /// Fixed destination, used when no schedule file is given
    #[arg(long, num_args = 2, value_names = ["X", "Y"], allow_hyphen_values = true)]
    dest: Option<Vec<f64>>,

    /// Destination schedule file
    #[arg(long, requires = "vehicle")]
    schedule: Option<PathBuf>,

    /// Vehicle name to look up in the schedule file
    #[arg(long)]
    vehicle: Option<String>,

    /// Clustering parameters as JSON
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

/// Operator commands read from stdin
enum Command {
    Send(String),
    Speed(f64),
    Position(Vec2),
    State,
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    match parts.as_slice() {
        ["send", rest @ ..] if !rest.is_empty() => Some(Command::Send(rest.join(" "))),
        ["speed", v] => v.parse().ok().map(Command::Speed),
        ["pos", x, y] => match (x.parse(), y.parse()) {
            (Ok(x), Ok(y)) => Some(Command::Position(Vec2::new(x, y))),
            _ => None,
        },
        ["state"] => Some(Command::State),
        ["quit"] | ["exit"] => Some(Command::Quit),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Setup logging
    let level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &args.config {
        Some(path) => ClusterConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => ClusterConfig::default(),
    };

    let schedule = match (&args.schedule, &args.vehicle, &args.dest) {
        (Some(path), Some(vehicle), _) => DestinationSchedule::load(path, vehicle)?,
        (_, _, Some(dest)) => DestinationSchedule::fixed(Vec2::new(dest[0], dest[1])),
        _ => DestinationSchedule::fixed(Vec2::new(args.x, args.y)),
    };

    let mut transport = Transport::new(args.port, args.peers.clone()).await?;
    let address = SocketAddr::new(args.advertise, transport.local_addr()?.port());
    info!("AMACAD node {} listening on {}", args.id, address);
    match transport.peers() {
        [] => info!("Broadcasting to 255.255.255.255:{}", args.port),
        peers => info!("Broadcast fans out to {} peers: {:?}", peers.len(), peers),
    }
    transport.start_receive();

    let mobility = StaticMobility::new(Vec2::new(args.x, args.y), args.speed);
    let mut node = ClusterNode::new(args.id, address, config, mobility, schedule)?;

    let start = Instant::now();
    node.activate(Duration::ZERO, &mut rand::thread_rng());

    let (command_tx, mut command_rx) = tokio::sync::mpsc::channel::<Command>(16);
    std::thread::spawn(move || {
        println!("\nCommands:");
        println!("  send <text>   - Broadcast a data packet");
        println!("  speed <v>     - Set current speed");
        println!("  pos <x> <y>   - Set current position");
        println!("  state         - Show clustering state");
        println!("  quit          - Exit\n");

        let stdin = io::stdin();
        for line in stdin.lock().lines().map_while(Result::ok) {
            match parse_command(&line) {
                Some(cmd) => {
                    if command_tx.blocking_send(cmd).is_err() {
                        break;
                    }
                }
                None if line.trim().is_empty() => {}
                None => println!("Unknown command. Try: send <text>"),
            }
        }
    });

    loop {
        let wake = match node.next_deadline() {
            Some((_, at)) => start + at,
            None => Instant::now() + Duration::from_secs(3600),
        };

        let result = tokio::select! {
            Some((packet, from)) = transport.recv() => {
                if packet.src != from {
                    warn!("Packet from {} claims source {}", from, packet.src);
                }
                node.handle_packet(packet, start.elapsed())
            }

            _ = tokio::time::sleep_until(wake) => {
                node.poll_timers(start.elapsed())
            }

            Some(cmd) = command_rx.recv() => {
                match cmd {
                    Command::Send(text) => {
                        Ok(node.send_data(text.into_bytes(), Destination::Broadcast, start.elapsed()))
                    }
                    Command::Speed(v) => {
                        node.mobility_mut().set_speed(v);
                        Ok(Vec::new())
                    }
                    Command::Position(p) => {
                        node.mobility_mut().set_position(p);
                        Ok(Vec::new())
                    }
                    Command::State => {
                        println!(
                            "node {} state={} head={:?} members={:?} neighbors={}",
                            node.id(),
                            node.state(),
                            node.cluster_head(),
                            node.members(),
                            node.neighbors().len()
                        );
                        Ok(Vec::new())
                    }
                    Command::Quit => break,
                }
            }

            _ = tokio::signal::ctrl_c() => break,
        };

        let effects = match result {
            Ok(effects) => effects,
            Err(e) => {
                error!("Node {}: {}", node.id(), e);
                continue;
            }
        };

        for effect in effects {
            match effect {
                Effect::Send(packet) => {
                    if let Err(e) = transport.send(&packet).await {
                        warn!("Send failed: {}", e);
                    }
                }
                Effect::Deliver { src, payload } => {
                    info!("Data from {}: {}", src, String::from_utf8_lossy(&payload));
                }
                Effect::Notify(event) => info!("Cluster event: {:?}", event),
            }
        }
    }

    node.shutdown();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert!(matches!(parse_command("send hello world"), Some(Command::Send(t)) if t == "hello world"));
        assert!(matches!(parse_command("speed 12.5"), Some(Command::Speed(v)) if v == 12.5));
        assert!(matches!(parse_command("pos -3 4"), Some(Command::Position(p)) if p == Vec2::new(-3.0, 4.0)));
        assert!(matches!(parse_command("state"), Some(Command::State)));
        assert!(parse_command("speed fast").is_none());
        assert!(parse_command("send").is_none());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "amacad-node", "--id", "3", "--peer", "127.0.0.1:9971", "--dest", "100", "-50",
        ])
        .unwrap();
        assert_eq!(args.id, 3);
        assert_eq!(args.peers.len(), 1);
        assert_eq!(args.dest, Some(vec![100.0, -50.0]));
        assert!(args.schedule.is_none());
    }
}
