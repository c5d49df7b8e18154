use super::*;
use serde_json::json;

#[test]
fn parses_hex_forms() {
    assert_eq!("#000000".parse::<Color>().unwrap(), Color::BLACK);
    assert_eq!("#F00".parse::<Color>().unwrap(), Color::rgb(255, 0, 0));
    assert_eq!(
        "#0000ff80".parse::<Color>().unwrap(),
        Color::rgba(0, 0, 255, 128)
    );
    assert!("#12345".parse::<Color>().is_err());
    assert!("#gg0000".parse::<Color>().is_err());
}

#[test]
fn parses_hsl_function_and_css_variable_triple() {
    let red = "hsl(0, 100%, 50%)".parse::<Color>().unwrap();
    assert_eq!(red, Color::rgb(255, 0, 0));

    // shadcn-style `--background: 0 0% 100%;`
    let white = "0 0% 100%".parse::<Color>().unwrap();
    assert_eq!(white, Color::WHITE);

    let translucent = "hsla(120, 100%, 25%, 0.5)".parse::<Color>().unwrap();
    assert_eq!(translucent, Color::rgba(0, 128, 0, 128));
}

#[test]
fn parses_rgb_function() {
    assert_eq!(
        "rgb(10, 20, 30)".parse::<Color>().unwrap(),
        Color::rgb(10, 20, 30)
    );
    assert_eq!(
        "rgba(10 20 30 / 50%)".parse::<Color>().unwrap(),
        Color::rgba(10, 20, 30, 128)
    );
}

#[test]
fn serde_uses_hex_strings() {
    let c: Color = serde_json::from_value(json!("#336699")).unwrap();
    assert_eq!(c, Color::rgb(0x33, 0x66, 0x99));
    assert_eq!(serde_json::to_value(c).unwrap(), json!("#336699"));

    let c: Color = serde_json::from_value(json!([1, 2, 3, 4])).unwrap();
    assert_eq!(serde_json::to_value(c).unwrap(), json!("#01020304"));
}
