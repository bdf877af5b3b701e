use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "bpfgen",
    version,
    about = "Generate classic BPF assembly for packet matching"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Match packets whose first DNS query name matches the given patterns
    Dns(DnsArgs),
}

/// Arguments of the `dns` subcommand.
#[derive(Args, Debug, Clone)]
pub struct DnsArgs {
    /// Domain patterns: `?` matches one byte, a sole `*` one label
    /// (bounded with `*{min-max}`), a trailing `**` any suffix
    #[arg(required = true, value_name = "PATTERN")]
    pub patterns: Vec<String>,

    /// Match domains case-insensitively (longer bytecode)
    #[arg(short, long)]
    pub ignorecase: bool,

    /// Invert the filter: matching packets are rejected
    #[arg(short, long)]
    pub negate: bool,

    /// Assume IPv6 with UDP directly after the fixed 40-byte header
    #[arg(short = '6', long)]
    pub inet6: bool,

    /// Offset of the network layer in the packet, e.g. 14 after an
    /// Ethernet header [default: 0]
    #[arg(long, default_value_t = 0, value_parser = validate_l3_off)]
    pub l3_off: u32,
}

fn validate_l3_off(s: &str) -> Result<u32, String> {
    let val: u32 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid integer"))?;
    if val > 1024 {
        Err("l3-off must be at most 1024 bytes".to_string())
    } else {
        Ok(val)
    }
}
