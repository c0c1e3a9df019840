use clap::{Parser, Subcommand};
use donate_reactor::application::form::{DonationForm, Submission};
use donate_reactor::config::{ClientVendorArgs, DonationArgs, ServerVendorArgs};
use donate_reactor::domain::token::CardDetails;
use donate_reactor::infrastructure::charge_api::ChargeApiClient;
use donate_reactor::interfaces::http::{AppState, build_router};
use miette::{IntoDiagnostic, Result, miette};
use rust_decimal::Decimal;
use std::net::SocketAddr;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    donation: DonationArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the charge endpoint.
    Serve {
        /// Socket address to bind, e.g. 127.0.0.1:3000
        #[arg(long, env = "LISTEN_ADDR", default_value = "127.0.0.1:3000")]
        listen: SocketAddr,

        #[command(flatten)]
        vendors: ServerVendorArgs,
    },
    /// Fill in the donation form once and submit it to a running server.
    Donate {
        /// Base URL of the charge endpoint's server.
        #[arg(long, default_value = "http://127.0.0.1:3000")]
        server: String,

        /// Donation amount in major units. Defaults to the form's initial value.
        #[arg(long)]
        amount: Option<Decimal>,

        #[arg(long)]
        cardholder_name: String,

        #[arg(long, default_value = "4242424242424242")]
        card_number: String,

        #[arg(long, default_value_t = 12)]
        exp_month: u8,

        #[arg(long, default_value_t = 2030)]
        exp_year: u16,

        #[arg(long, default_value = "123")]
        cvc: String,

        #[command(flatten)]
        vendors: ClientVendorArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "donate_reactor=info,info".to_string()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let rules = cli.donation.rules().into_diagnostic()?;

    match cli.command {
        Command::Serve { listen, vendors } => {
            let charges = vendors.charge_service(rules).into_diagnostic()?;
            let app = build_router(AppState::new(charges));

            let listener = tokio::net::TcpListener::bind(listen)
                .await
                .into_diagnostic()?;
            info!("donate-reactor listening on {}", listener.local_addr().into_diagnostic()?);
            axum::serve(listener, app).await.into_diagnostic()?;
        }
        Command::Donate {
            server,
            amount,
            cardholder_name,
            card_number,
            exp_month,
            exp_year,
            cvc,
            vendors,
        } => {
            let tokenizer = vendors.tokenizer().into_diagnostic()?;
            let api = ChargeApiClient::new(&server).into_diagnostic()?;
            let mut form = DonationForm::new(rules, Some(tokenizer), Box::new(api));
            if let Some(amount) = amount {
                form.set_custom_donation(amount);
            }
            form.set_cardholder_name(cardholder_name);

            let card = CardDetails {
                number: card_number,
                expiration_month: exp_month,
                expiration_year: exp_year,
                cvc,
            };

            println!("{}", form.donate_label());
            match form.submit(&card).await {
                Submission::Skipped(reason) => {
                    return Err(miette!("form was not submitted: {:?}", reason));
                }
                Submission::Completed(_) => {
                    if let Some(headline) = form.status_headline() {
                        println!("{headline}");
                    }
                    println!(
                        "{}",
                        serde_json::to_string_pretty(form.payment()).into_diagnostic()?
                    );
                }
            }
        }
    }

    Ok(())
}
