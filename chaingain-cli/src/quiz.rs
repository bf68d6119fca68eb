//! Line-based quiz: one card per prompt, Enter to move on.

use std::io::{BufRead, Write};

use chaingain_core::{ChainGain, Correctness, Deck, Progress, Session, SessionStep};
use eyre::WrapErr;

const STARTER_DECK: &str = include_str!("starter_deck.json");

/// The deck used when no `--deck` is given.
pub fn starter_deck() -> eyre::Result<Deck> {
    Deck::from_json(STARTER_DECK).wrap_err("built-in deck is invalid")
}

/// Reads one line, without its terminator. `None` on end of input.
fn read_answer(input: &mut impl BufRead) -> eyre::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Walks `deck` until the last card is acknowledged or input ends.
///
/// The account must already be provisioned.
pub async fn run(
    client: &ChainGain,
    deck: &Deck,
    mut input: impl BufRead,
    mut out: impl Write,
) -> eyre::Result<Progress> {
    let mut session = Session::new(deck);
    let language = client.config().language;

    loop {
        let progress = session.progress();
        let state = session.card().state();
        write!(
            out,
            "[{}/{}] {} ({language}): ",
            progress.position, progress.total, state.word
        )?;
        out.flush()?;

        let Some(answer) = read_answer(&mut input)? else {
            writeln!(out)?;
            break;
        };
        session.set_input(answer);
        client.submit(&mut session).await?;

        let state = session.card().state();
        if state.correct == Correctness::Correct {
            writeln!(out, "  correct!")?;
        } else if let Some(expected) = &state.correct_word {
            writeln!(out, "  incorrect, expected: {expected}")?;
        } else {
            writeln!(out, "  incorrect")?;
        }
        if let Some(certificate) = &state.certificate {
            writeln!(out, "  certificate: {}", client.certificate_url(certificate))?;
        }

        write!(out, "  [{}] ", state.stage.button_label())?;
        out.flush()?;
        if read_answer(&mut input)?.is_none() {
            writeln!(out)?;
            break;
        }
        if client.submit(&mut session).await? == SessionStep::Finished {
            break;
        }
    }

    let progress = session.progress();
    writeln!(
        out,
        "{} of {} answered correctly, {} certificate(s) earned",
        progress.correct_answers,
        progress.total,
        progress.certificates.len()
    )?;
    Ok(progress)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Arc;

    use chaingain_core::storage::MemoryStore;
    use chaingain_core::ClientConfig;

    use super::*;

    #[test]
    fn test_starter_deck_is_valid() {
        let deck = starter_deck().unwrap();
        assert!(deck.len() > 1);
    }

    #[tokio::test]
    async fn test_quiz_walks_the_deck() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/createKey")
            .with_status(200)
            .with_body(r#"{"AccId": "0.0.4515", "PubKey": "pub", "PrivKey": "priv"}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/verifyWord")
            .match_body(mockito::Matcher::PartialJson(
                serde_json::json!({"OriginalString": "house"}),
            ))
            .with_status(200)
            .with_body(r#"{"Correct": true, "Certificate": "bafy123"}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/verifyWord")
            .match_body(mockito::Matcher::PartialJson(
                serde_json::json!({"OriginalString": "tree"}),
            ))
            .with_status(200)
            .with_body(r#"{"Correct": false, "CorrectWord": "Baum"}"#)
            .create_async()
            .await;

        let config = ClientConfig::default()
            .with_base_url(server.url())
            .with_allow_insecure(true);
        let client = ChainGain::new(config, Arc::new(MemoryStore::new())).unwrap();
        client.init().await.unwrap();

        let deck = Deck::from_json(
            r#"[{"word": "house", "translation": "Haus"}, {"word": "tree", "translation": "Baum"}]"#,
        )
        .unwrap();
        let mut out = Vec::new();
        let progress = run(&client, &deck, Cursor::new("Haus\n\nBäume\n\n"), &mut out)
            .await
            .unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("[1/2] house (de): "));
        assert!(out.contains("certificate: https://ipfs.io/ipfs/bafy123"));
        assert!(out.contains("incorrect, expected: Baum"));
        assert!(out.contains("1 of 2 answered correctly, 1 certificate(s) earned"));
        assert_eq!(progress.correct_answers, 1);
    }

    #[tokio::test]
    async fn test_quiz_stops_at_end_of_input() {
        let client = ChainGain::new(ClientConfig::default(), Arc::new(MemoryStore::new()))
            .unwrap();
        let mut out = Vec::new();
        let progress = run(&client, &starter_deck().unwrap(), Cursor::new(""), &mut out)
            .await
            .unwrap();
        assert_eq!(progress.position, 1);
        assert_eq!(progress.correct_answers, 0);
    }
}
