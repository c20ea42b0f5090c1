use std::path::PathBuf;

use clap::{Parser, Subcommand};
use near_quiz::protocol::DEFAULT_PORT;
use near_quiz::server::{self, ServerConfig};
use near_quiz::{client, QuizError};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Host the quiz ledger
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Account allowed to create and publish quizzes
        #[arg(short, long, env = "QUIZ_OWNER")]
        owner: String,

        /// JSON file of quizzes to create at startup
        #[arg(short, long)]
        quizzes: Option<PathBuf>,
    },
    /// Answer published quizzes in the terminal
    Play {
        /// Server host
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Server port
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Account to answer as
        #[arg(short, long, env = "QUIZ_ACCOUNT")]
        account: String,
    },
}

#[tokio::main]
async fn main() {
    pretty_env_logger::init();
    let args = Args::parse();

    let result: Result<(), QuizError> = match args.command {
        Command::Serve {
            port,
            owner,
            quizzes,
        } => {
            server::run(ServerConfig {
                port,
                owner_id: owner,
                quizzes_path: quizzes,
            })
            .await
        }
        Command::Play {
            host,
            port,
            account,
        } => client::run(host, port, account).await,
    };

    if let Err(e) = result {
        log::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
