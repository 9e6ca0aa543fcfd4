use crate::model::RemoteCommand;

pub const COMMAND_PARAMS: [&str; 4] = ["command", "cmd", "action", "op"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandRequest {
    Info,
    Control(RemoteCommand),
}

pub fn parse_command(token: &str) -> Option<CommandRequest> {
    match token.to_ascii_lowercase().as_str() {
        "info" => Some(CommandRequest::Info),
        "play" | "start" | "resume" | "stop" | "pause" | "halt" | "playtoggle" | "toggle" => {
            Some(CommandRequest::Control(RemoteCommand::PlayToggle))
        }
        "next" | "forward" => Some(CommandRequest::Control(RemoteCommand::Next)),
        "prev" | "previous" | "back" => Some(CommandRequest::Control(RemoteCommand::Prev)),
        _ => None,
    }
}

// Param-name priority first, then first occurrence of that name.
pub fn select_raw_command(pairs: &[(String, String)]) -> Option<&str> {
    COMMAND_PARAMS.iter().find_map(|name| {
        pairs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn aliases_collapse_to_playtoggle() {
        for token in ["pause", "toggle", "PLAY", "stop", "halt", "Resume"] {
            assert_eq!(
                parse_command(token),
                Some(CommandRequest::Control(RemoteCommand::PlayToggle)),
                "token {token}"
            );
        }
    }

    #[test]
    fn skip_aliases_and_info() {
        assert_eq!(
            parse_command("NEXT"),
            Some(CommandRequest::Control(RemoteCommand::Next))
        );
        assert_eq!(
            parse_command("forward"),
            Some(CommandRequest::Control(RemoteCommand::Next))
        );
        assert_eq!(
            parse_command("previous"),
            Some(CommandRequest::Control(RemoteCommand::Prev))
        );
        assert_eq!(
            parse_command("back"),
            Some(CommandRequest::Control(RemoteCommand::Prev))
        );
        assert_eq!(parse_command("Info"), Some(CommandRequest::Info));
    }

    #[test]
    fn unrecognized_tokens_map_to_nothing() {
        assert_eq!(parse_command("jump"), None);
        assert_eq!(parse_command(""), None);
    }

    #[test]
    fn param_priority_is_fixed() {
        let q = pairs(&[("op", "next"), ("action", "prev"), ("command", "pause")]);
        assert_eq!(select_raw_command(&q), Some("pause"));

        let q = pairs(&[("action", "next"), ("cmd", "info")]);
        assert_eq!(select_raw_command(&q), Some("info"));
    }

    #[test]
    fn first_occurrence_of_a_name_wins() {
        let q = pairs(&[("cmd", "next"), ("cmd", "prev")]);
        assert_eq!(select_raw_command(&q), Some("next"));
    }

    #[test]
    fn no_recognized_param_selects_nothing() {
        assert_eq!(select_raw_command(&pairs(&[("other", "info")])), None);
        assert_eq!(select_raw_command(&[]), None);
    }
}
