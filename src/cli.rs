use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "Provision Utility",
    version = "0.1.0",
    about = "Command-line tool for staging ISO images on Proxmox nodes"
)]
pub struct Cli {
    #[arg(short, long, help = "Name of the target Proxmox node", env = "PROVISION_NODE")]
    pub node: String,
    #[arg(
        short,
        long,
        help = "Filename of the ISO to make available on the node",
        env = "PROVISION_FILENAME"
    )]
    pub filename: String,
    #[arg(
        short,
        long,
        help = "Source URL to download the ISO from when it is missing",
        env = "PROVISION_URL"
    )]
    pub url: String,
}
