use std::path::PathBuf;
use std::time::Duration;

use canvas::camera::{Ball, Viewport};
use canvas::engine::EngineCore;
use canvas::gate::AccessState;
use canvas::holdings::{HoldingsChecker, HoldingsConfig, HoldingsError, RpcHoldingsChecker};
use canvas::raster::Raster;
use canvas::surface::SurfaceError;
use canvas::sync::{Backoff, ConnectionStatus, NetEvent, NullTransport, decode_bytes, decode_text};
use clap::{Args, Parser, Subcommand};
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use wire::{ClientMessage, Stroke};

#[cfg(test)]
#[path = "main_test.rs"]
mod main_test;

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("websocket connect failed: {0}")]
    WsConnect(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("websocket closed")]
    WsClosed,
    #[error("timed out waiting for the history snapshot")]
    Timeout,
    #[error("message decode failed: {0}")]
    Codec(#[from] wire::CodecError),
    #[error("render failed: {0}")]
    Surface(#[from] SurfaceError),
    #[error("holdings check failed: {0}")]
    Holdings(#[from] HoldingsError),
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

impl From<tokio_tungstenite::tungstenite::Error> for CliError {
    fn from(error: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::WsConnect(Box::new(error))
    }
}

#[derive(Parser, Debug)]
#[command(name = "ball-cli", about = "Headless client for the shared ball canvas")]
struct Cli {
    #[arg(long, env = "BALL_WS_URL", default_value = "ws://127.0.0.1:3000/ws")]
    url: String,

    /// Seconds to wait for the server before giving up.
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the current canvas to a PNG.
    Snapshot(SnapshotArgs),
    /// Follow the live stroke stream, reconnecting on drops.
    Watch(WatchArgs),
    /// Send a single stroke.
    Draw(DrawArgs),
    /// Check a wallet's holdings and print the access tier it earns.
    Holdings { address: String },
}

#[derive(Args, Debug)]
struct SnapshotArgs {
    #[arg(long)]
    out: PathBuf,

    #[arg(long, default_value_t = 800)]
    width: u32,

    #[arg(long, default_value_t = 800)]
    height: u32,

    /// Write the whole persistent buffer instead of a fitted view.
    #[arg(long, default_value_t = false)]
    buffer: bool,
}

#[derive(Args, Debug)]
struct WatchArgs {
    /// Stop after this many events.
    #[arg(long)]
    max_events: Option<usize>,
}

#[derive(Args, Debug)]
struct DrawArgs {
    /// Start point in world units, as `X,Y`.
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    from: (f64, f64),

    /// End point in world units, as `X,Y`.
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    to: (f64, f64),

    #[arg(long, default_value = wire::DEFAULT_COLOR)]
    color: String,

    #[arg(long, default_value_t = wire::DEFAULT_SIZE)]
    size: f64,

    /// Send protobuf instead of JSON.
    #[arg(long, default_value_t = false)]
    binary: bool,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let timeout = Duration::from_secs(cli.timeout_secs);

    match cli.command {
        Command::Snapshot(args) => run_snapshot(&cli.url, timeout, args).await,
        Command::Watch(args) => run_watch(&cli.url, args).await,
        Command::Draw(args) => run_draw(&cli.url, args).await,
        Command::Holdings { address } => run_holdings(&address).await,
    }
}

async fn run_snapshot(url: &str, timeout: Duration, args: SnapshotArgs) -> Result<(), CliError> {
    let mut stream = connect(url).await?;
    let strokes = loop {
        match recv_event(&mut stream, timeout).await? {
            NetEvent::HistorySnapshot(strokes) => break strokes,
            other => tracing::debug!(event = ?other, "skipping event before snapshot"),
        }
    };
    if let Err(error) = stream.close(None).await {
        tracing::debug!(%error, "close after snapshot failed");
    }

    let count = strokes.len();
    let png = render_png(strokes, Ball::default(), &args)?;
    std::fs::write(&args.out, &png)?;
    tracing::info!(strokes = count, bytes = png.len(), out = %args.out.display(), "snapshot written");
    Ok(())
}

/// Replay `strokes` into a headless engine and encode either the fitted
/// view or the raw persistent buffer.
fn render_png(strokes: Vec<Stroke>, ball: Ball, args: &SnapshotArgs) -> Result<Vec<u8>, CliError> {
    let size = ball.world_size();
    let mut engine = EngineCore::new(Raster::new(size, size), ball, Box::new(NullTransport))?;
    engine.on_net_event(NetEvent::HistorySnapshot(strokes));

    if args.buffer {
        return Ok(engine.buffer.layer().encode_png()?);
    }

    engine.set_viewport(Viewport::sized(f64::from(args.width), f64::from(args.height), 1.0));
    engine.fit_to_ball();
    let mut display = Raster::new(args.width, args.height);
    engine.render(&mut display)?;
    Ok(display.encode_png()?)
}

async fn run_watch(url: &str, args: WatchArgs) -> Result<(), CliError> {
    let ball = Ball::default();
    let size = ball.world_size();
    let mut engine = EngineCore::new(Raster::new(size, size), ball, Box::new(NullTransport))?;
    let mut backoff = Backoff::new();
    let mut seen = 0_usize;

    loop {
        engine.on_net_event(NetEvent::ConnectionStateChanged(ConnectionStatus::Connecting));
        match connect(url).await {
            Ok(mut stream) => {
                engine.on_net_event(NetEvent::ConnectionStateChanged(ConnectionStatus::Connected));
                backoff.reset();
                loop {
                    let event = match next_event(&mut stream).await {
                        Ok(event) => event,
                        Err(error) => {
                            tracing::warn!(%error, "stream ended");
                            break;
                        }
                    };
                    tracing::info!(event = %describe(&event), total = engine.stroke_count(), "event");
                    for action in engine.on_net_event(event) {
                        tracing::debug!(?action, "engine action");
                    }
                    seen += 1;
                    if args.max_events.is_some_and(|limit| seen >= limit) {
                        tracing::info!(events = seen, strokes = engine.stroke_count(), "watch complete");
                        return Ok(());
                    }
                }
            }
            Err(error) => tracing::warn!(%error, "connect failed"),
        }

        for action in engine.on_net_event(NetEvent::ConnectionStateChanged(ConnectionStatus::Disconnected)) {
            tracing::debug!(?action, "engine action");
        }
        let delay = backoff.next_delay_ms();
        tracing::info!(delay_ms = delay, "reconnecting");
        tokio::time::sleep(Duration::from_millis(u64::from(delay))).await;
    }
}

async fn run_draw(url: &str, args: DrawArgs) -> Result<(), CliError> {
    let stroke = Stroke::new(args.from, args.to, args.color, args.size);
    let message = outbound_message(&ClientMessage::Stroke(stroke.clone()), args.binary)?;

    let mut stream = connect(url).await?;
    stream.send(message).await?;
    stream.close(None).await?;
    tracing::info!(
        from = ?stroke.start(),
        to = ?stroke.end(),
        color = %stroke.color,
        size = stroke.size,
        binary = args.binary,
        "stroke sent"
    );
    Ok(())
}

async fn run_holdings(address: &str) -> Result<(), CliError> {
    let config = HoldingsConfig::from_env()?;
    let checker = RpcHoldingsChecker::new(config)?;
    let holdings = checker.check(address).await?;

    let mut access = AccessState::new();
    access.wallet_connected(address.trim());
    let tier = access.resolve(address.trim(), Ok(holdings));

    let report = json!({
        "address": address.trim(),
        "access": tier,
        "holdings": access.holdings(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn connect(url: &str) -> Result<WsStream, CliError> {
    let (stream, _) = connect_async(url).await?;
    tracing::debug!(url, "connected");
    Ok(stream)
}

async fn recv_event(stream: &mut WsStream, timeout: Duration) -> Result<NetEvent, CliError> {
    tokio::time::timeout(timeout, next_event(stream))
        .await
        .map_err(|_| CliError::Timeout)?
}

async fn next_event(stream: &mut WsStream) -> Result<NetEvent, CliError> {
    loop {
        let Some(message) = stream.next().await else {
            return Err(CliError::WsClosed);
        };
        match decode_message(message?) {
            Ok(Some(event)) => return Ok(event),
            Ok(None) => {}
            Err(CliError::Codec(error)) => tracing::warn!(%error, "dropping undecodable message"),
            Err(error) => return Err(error),
        }
    }
}

/// A websocket message as a net event. `None` for control frames.
fn decode_message(message: Message) -> Result<Option<NetEvent>, CliError> {
    match message {
        Message::Text(text) => Ok(Some(decode_text(text.as_str())?)),
        Message::Binary(bytes) => Ok(Some(decode_bytes(&bytes)?)),
        Message::Close(_) => Err(CliError::WsClosed),
        Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => Ok(None),
    }
}

fn outbound_message(message: &ClientMessage, binary: bool) -> Result<Message, CliError> {
    if binary {
        Ok(Message::Binary(wire::encode_client(message).into()))
    } else {
        Ok(Message::Text(message.to_json()?.into()))
    }
}

fn describe(event: &NetEvent) -> String {
    match event {
        NetEvent::HistorySnapshot(strokes) => format!("history snapshot ({} strokes)", strokes.len()),
        NetEvent::StrokeAppended(stroke) => {
            let (x0, y0) = stroke.start();
            let (x1, y1) = stroke.end();
            format!("stroke ({x0},{y0}) -> ({x1},{y1}) {} {}", stroke.color, stroke.size)
        }
        NetEvent::ConnectionStateChanged(status) => format!("connection {status:?}"),
    }
}

fn parse_point(raw: &str) -> Result<(f64, f64), String> {
    let (x, y) = raw.split_once(',').ok_or_else(|| format!("expected X,Y, got {raw:?}"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<f64>()
            .map_err(|error| format!("invalid coordinate {part:?}: {error}"))
            .and_then(|v| if v.is_finite() { Ok(v) } else { Err(format!("coordinate {part:?} is not finite")) })
    };
    Ok((parse(x)?, parse(y)?))
}
