use clap::builder::NonEmptyStringValueParser;
use clap::{crate_authors, crate_description, crate_name, crate_version};
use clap::{Arg, ArgMatches, Command};

use someip_arxml_decoder::types::{
    Endianness, LengthFieldSize, LengthFieldUnit, SerializationParameter,
};

/// decimal or 0x-prefixed hex
fn parse_number(s: &str) -> Result<u64, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse::<u64>(),
    };
    parsed.map_err(|e| format!("{}: {}", s, e))
}

pub fn parse_service_id(s: &str) -> Result<u16, String> {
    u16::try_from(parse_number(s)?).map_err(|_| format!("{} does not fit in 16 bits", s))
}

pub fn parse_id(s: &str) -> Result<u32, String> {
    u32::try_from(parse_number(s)?).map_err(|_| format!("{} does not fit in 32 bits", s))
}

fn parse_length_field_size(s: &str) -> Result<LengthFieldSize, String> {
    let bytes = s.parse::<u8>().map_err(|e| format!("{}: {}", s, e))?;
    LengthFieldSize::try_from(bytes)
}

/// Hex dump of the payload, whitespace and an optional 0x prefix allowed.
pub fn parse_payload(s: &str) -> Result<Vec<u8>, String> {
    let digits: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .unwrap_or(&digits);
    hex::decode(digits).map_err(|e| format!("payload: {}", e))
}

pub fn command() -> Command {
    Command::new(crate_name!())
        .version(crate_version!())
        .author(crate_authors!("\n"))
        .about(crate_description!())
        .arg(
            Arg::new("config")
                .help("the configuration document, json.")
                .value_parser(NonEmptyStringValueParser::new())
                .long("config")
                .short('c')
                .num_args(1)
                .required(true),
        )
        .arg(
            Arg::new("service")
                .help("someip service id, decimal or 0x hex.")
                .value_parser(parse_service_id)
                .long("service")
                .short('s')
                .num_args(1)
                .required(true),
        )
        .arg(
            Arg::new("id")
                .help("event/field id (adaptive) or header id (classic), decimal or 0x hex.")
                .value_parser(parse_id)
                .long("id")
                .short('i')
                .num_args(1)
                .required(true),
        )
        .arg(
            Arg::new("little-endian")
                .help("payload numbers are little endian.")
                .long("little-endian")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("length-field-size")
                .help("width of sequence length fields in bytes: 1, 2 or 4.")
                .value_parser(parse_length_field_size)
                .long("length-field-size")
                .num_args(1)
                .default_value("4"),
        )
        .arg(
            Arg::new("length-field-unit")
                .help("what sequence length fields count.")
                .value_parser(["bytes", "elements"])
                .long("length-field-unit")
                .num_args(1)
                .default_value("bytes"),
        )
        .arg(
            Arg::new("alignment")
                .help("padding after variable-width elements, 0 for none.")
                .value_parser(clap::value_parser!(usize))
                .long("alignment")
                .num_args(1)
                .default_value("0"),
        )
        .arg(
            Arg::new("max-depth")
                .help("maximum record nesting.")
                .value_parser(clap::value_parser!(usize))
                .long("max-depth")
                .num_args(1)
                .default_value("64"),
        )
        .arg(
            Arg::new("debug")
                .help("debug info")
                .long("debug")
                .short('d')
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("payload")
                .help("payload bytes as hex, like: 00000008efbbbf5465737400")
                .value_parser(parse_payload)
                .required(true),
        )
}

pub fn serialization_parameter(matches: &ArgMatches) -> SerializationParameter {
    let mut config = SerializationParameter::default();
    if matches.get_flag("little-endian") {
        config = config.with_endianness(Endianness::LittleEndian);
    }
    if let Some(size) = matches.get_one::<LengthFieldSize>("length-field-size") {
        config = config.with_length_field_size(*size);
    }
    if matches
        .get_one::<String>("length-field-unit")
        .is_some_and(|unit| unit == "elements")
    {
        config = config.with_length_field_unit(LengthFieldUnit::Elements);
    }
    if let Some(alignment) = matches.get_one::<usize>("alignment") {
        config = config.with_alignment(*alignment);
    }
    if let Some(max_depth) = matches.get_one::<usize>("max-depth") {
        config = config.with_max_depth(*max_depth);
    }
    config
}
