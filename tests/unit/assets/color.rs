use super::*;

#[test]
fn parses_short_long_and_alpha_forms() {
    assert_eq!(
        parse_hex_color("#fff").unwrap(),
        Rgba8Premul::opaque(255, 255, 255)
    );
    assert_eq!(
        parse_hex_color("ff9500").unwrap(),
        Rgba8Premul::opaque(255, 149, 0)
    );
    assert_eq!(
        parse_hex_color("#FF000080").unwrap(),
        Rgba8Premul::from_straight_rgba(255, 0, 0, 128)
    );
}

#[test]
fn rejects_malformed_colors() {
    assert!(parse_hex_color("#ff").is_err());
    assert!(parse_hex_color("#gggggg").is_err());
    assert!(parse_hex_color("#ffé").is_err());
}

#[test]
fn hex_formatting_is_stable_for_opaque_colors() {
    assert_eq!(to_hex_color(Rgba8Premul::opaque(255, 149, 0)), "#ff9500");
    assert_eq!(to_hex_color(Rgba8Premul::transparent()), "#00000000");
}

#[test]
fn serde_hex_round_trips_through_json() {
    #[derive(serde::Serialize, serde::Deserialize)]
    struct Wrap {
        #[serde(with = "serde_hex")]
        c: Rgba8Premul,
    }

    let w: Wrap = serde_json::from_str(r##"{"c":"#031023"}"##).unwrap();
    assert_eq!(w.c, Rgba8Premul::opaque(0x03, 0x10, 0x23));
    assert_eq!(serde_json::to_string(&w).unwrap(), r##"{"c":"#031023"}"##);

    assert!(serde_json::from_str::<Wrap>(r##"{"c":"nope"}"##).is_err());
}
