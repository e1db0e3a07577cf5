use clap::CommandFactory;
use wire::ServerMessage;

use super::*;

// =============================================================
// Argument parsing
// =============================================================

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn parse_point_accepts_signed_decimals() {
    assert_eq!(parse_point("10,-5.5"), Ok((10.0, -5.5)));
    assert_eq!(parse_point(" -1 , 2 "), Ok((-1.0, 2.0)));
}

#[test]
fn parse_point_rejects_bad_input() {
    assert!(parse_point("10").is_err());
    assert!(parse_point("a,b").is_err());
    assert!(parse_point("inf,0").is_err());
}

#[test]
fn draw_takes_negative_coordinates() {
    let cli = Cli::try_parse_from(["ball-cli", "draw", "--from", "-100,20", "--to", "30,-40"]).unwrap();
    let Command::Draw(args) = cli.command else {
        panic!("expected draw");
    };
    assert_eq!(args.from, (-100.0, 20.0));
    assert_eq!(args.to, (30.0, -40.0));
    assert_eq!(args.color, wire::DEFAULT_COLOR);
    assert!((args.size - wire::DEFAULT_SIZE).abs() < f64::EPSILON);
    assert!(!args.binary);
}

#[test]
fn snapshot_defaults() {
    let cli = Cli::try_parse_from(["ball-cli", "--url", "ws://example:9/ws", "snapshot", "--out", "x.png"]).unwrap();
    assert_eq!(cli.url, "ws://example:9/ws");
    let Command::Snapshot(args) = cli.command else {
        panic!("expected snapshot");
    };
    assert_eq!((args.width, args.height), (800, 800));
    assert!(!args.buffer);
}

// =============================================================
// Wire handling
// =============================================================

fn stroke() -> Stroke {
    Stroke::new((1.0, 2.0), (3.0, 4.0), "#ff0000", 3.0)
}

#[test]
fn outbound_json_is_a_text_frame() {
    let message = outbound_message(&ClientMessage::Stroke(stroke()), false).unwrap();
    let Message::Text(text) = message else {
        panic!("expected a text frame");
    };
    let value: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
    assert_eq!(value["type"], "stroke");
    assert_eq!(value["x1"], 3.0);
}

#[test]
fn outbound_binary_decodes_on_the_server_side() {
    let message = outbound_message(&ClientMessage::Stroke(stroke()), true).unwrap();
    let Message::Binary(bytes) = message else {
        panic!("expected a binary frame");
    };
    assert_eq!(wire::decode_client(&bytes).unwrap(), ClientMessage::Stroke(stroke()));
}

#[test]
fn decode_message_handles_each_frame_kind() {
    let json = ServerMessage::Stroke(stroke()).to_json().unwrap();
    assert_eq!(
        decode_message(Message::Text(json.into())).unwrap(),
        Some(NetEvent::StrokeAppended(stroke()))
    );

    let bytes = wire::encode_server(&ServerMessage::HistorySnapshot { strokes: vec![stroke()] });
    assert_eq!(
        decode_message(Message::Binary(bytes.into())).unwrap(),
        Some(NetEvent::HistorySnapshot(vec![stroke()]))
    );

    assert_eq!(decode_message(Message::Ping(Vec::new().into())).unwrap(), None);
    assert!(matches!(decode_message(Message::Close(None)), Err(CliError::WsClosed)));
    assert!(matches!(decode_message(Message::Text("{}".into())), Err(CliError::Codec(_))));
}

#[test]
fn describe_names_the_event() {
    assert_eq!(describe(&NetEvent::HistorySnapshot(vec![stroke(), stroke()])), "history snapshot (2 strokes)");
    assert!(describe(&NetEvent::StrokeAppended(stroke())).starts_with("stroke (1,2) -> (3,4)"));
}

// =============================================================
// Snapshot rendering
// =============================================================

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

fn snapshot_args(buffer: bool) -> SnapshotArgs {
    SnapshotArgs { out: PathBuf::from("unused.png"), width: 64, height: 48, buffer }
}

#[test]
fn render_png_fitted_view() {
    let png = render_png(vec![stroke()], Ball { radius: 20.0 }, &snapshot_args(false)).unwrap();
    assert_eq!(png[..8], PNG_SIGNATURE);
    let image = image_size(&png);
    assert_eq!(image, (64, 48));
}

#[test]
fn render_png_whole_buffer() {
    let ball = Ball { radius: 20.0 };
    let png = render_png(vec![stroke()], ball, &snapshot_args(true)).unwrap();
    assert_eq!(image_size(&png), (ball.world_size(), ball.world_size()));
}

/// Width and height from the IHDR chunk.
fn image_size(png: &[u8]) -> (u32, u32) {
    let be = |at: usize| u32::from_be_bytes([png[at], png[at + 1], png[at + 2], png[at + 3]]);
    (be(16), be(20))
}
