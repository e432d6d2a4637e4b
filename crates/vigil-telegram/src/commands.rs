//! Chat command parsing.
//!
//! | Command | Arguments |
//! |---------|-----------|
//! | `/start` | — |
//! | `/register` | `<name> <contact_id>` |
//! | `/checkin` | — |
//!
//! Telegram appends `@botname` to commands in group chats; the suffix is
//! ignored.

use vigil_core::Error;

pub const REGISTER_USAGE: &str = "Usage: /register <your_name> <trusted_contact_id>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
  Start,
  Register { name: String, contact_id: String },
  Checkin,
}

impl Command {
  /// Parse a message text.
  ///
  /// `Ok(None)` means the text is not one of ours and should be ignored.
  /// A known command with missing arguments is [`Error::MalformedInput`]
  /// carrying the usage line.
  pub fn parse(text: &str) -> Result<Option<Self>, Error> {
    let mut words = text.split_whitespace();
    let Some(head) = words.next().and_then(|w| w.strip_prefix('/')) else {
      return Ok(None);
    };
    let name = head.split_once('@').map_or(head, |(name, _bot)| name);

    match name {
      "start" => Ok(Some(Self::Start)),
      "checkin" => Ok(Some(Self::Checkin)),
      "register" => match (words.next(), words.next()) {
        (Some(name), Some(contact_id)) => Ok(Some(Self::Register {
          name:       name.to_owned(),
          contact_id: contact_id.to_owned(),
        })),
        _ => Err(Error::MalformedInput(REGISTER_USAGE.to_owned())),
      },
      _ => Ok(None),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_known_commands() {
    assert_eq!(Command::parse("/start").unwrap(), Some(Command::Start));
    assert_eq!(Command::parse("  /checkin  ").unwrap(), Some(Command::Checkin));
    assert_eq!(
      Command::parse("/register Alice 12345").unwrap(),
      Some(Command::Register {
        name:       "Alice".into(),
        contact_id: "12345".into(),
      })
    );
  }

  #[test]
  fn extra_register_arguments_are_ignored() {
    assert_eq!(
      Command::parse("/register Bob 777 please").unwrap(),
      Some(Command::Register {
        name:       "Bob".into(),
        contact_id: "777".into(),
      })
    );
  }

  #[test]
  fn bot_suffix_is_stripped() {
    assert_eq!(
      Command::parse("/checkin@vigil_bot").unwrap(),
      Some(Command::Checkin)
    );
  }

  #[test]
  fn register_without_enough_arguments_is_malformed() {
    for text in ["/register", "/register Alice"] {
      assert_eq!(
        Command::parse(text),
        Err(Error::MalformedInput(REGISTER_USAGE.into())),
        "{text}"
      );
    }
  }

  #[test]
  fn other_text_is_ignored() {
    assert_eq!(Command::parse("hello").unwrap(), None);
    assert_eq!(Command::parse("").unwrap(), None);
    assert_eq!(Command::parse("/help").unwrap(), None);
  }
}
