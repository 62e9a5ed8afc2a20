use clap::Parser;

#[derive(Parser)]
#[command(
    name = "ytchat",
    about = "Chat with a YouTube video, grounded on its subtitles",
    version
)]
pub struct Cli {
    /// Address to listen on
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Gemini model for the chat session
    #[arg(short, long)]
    pub model: Option<String>,

    /// Log debug details
    #[arg(short, long)]
    pub verbose: bool,
}
