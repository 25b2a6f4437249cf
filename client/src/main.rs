//! Schwatz Konsolen-Client
//!
//! Aufruf: `schwatz-client ADDRESS USERNAME`

use anyhow::{Context, Result};
use schwatz_client::{anmelden, sitzung_ausfuehren};
use schwatz_core::Benutzername;
use schwatz_protocol::{HandshakeAntwort, PUFFER_GROESSE};
use tokio::io::BufReader;
use tokio::net::TcpStream;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let [adresse, benutzername] = args.as_slice() else {
        println!("Usage: schwatz-client ADDRESS USERNAME");
        return Ok(());
    };

    // Logs stoeren den Chat auf stdout nicht, gehen aber nur ab warn raus
    schwatz_observability::logging_initialisieren("warn", "text");

    let benutzername = Benutzername::neu(benutzername.as_str())?;

    let mut stream = TcpStream::connect(adresse.as_str())
        .await
        .with_context(|| format!("Verbindung zu '{adresse}' fehlgeschlagen"))?;

    let anmeldung = anmelden(&mut stream, &benutzername, PUFFER_GROESSE)
        .await
        .context("Handshake fehlgeschlagen")?;
    println!("Server message: {}", anmeldung.text);

    if anmeldung.antwort == HandshakeAntwort::NameVergeben {
        println!("Shutting down");
        return Ok(());
    }
    if let HandshakeAntwort::Unbekannt(text) = &anmeldung.antwort {
        tracing::warn!(antwort = %text, "Unerwartete Handshake-Antwort");
    }

    let ende = sitzung_ausfuehren(
        stream,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
        PUFFER_GROESSE,
    )
    .await;
    tracing::debug!(?ende, "Sitzung beendet");

    println!("Shutting down");
    // Der Blocking-Thread von stdin wuerde das Runtime-Ende aufhalten
    std::process::exit(0);
}
