use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

struct Board {
    dir: TempDir,
    file: PathBuf,
}

impl Board {
    fn new() -> Self {
        let dir = tempdir().unwrap();
        let file = dir.path().join("board.json");
        Self { dir, file }
    }

    fn cmd(&self) -> Command {
        birdseye(self.dir.path())
    }

    fn run(&self, args: &[&str]) -> Value {
        let output = self
            .cmd()
            .arg("--file")
            .arg(&self.file)
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let json: Value = serde_json::from_slice(&output).expect("Failed to parse JSON output");
        assert!(json["success"].as_bool().unwrap());
        json["data"].clone()
    }

    fn fail(&self, args: &[&str]) -> Value {
        let output = self
            .cmd()
            .arg("--file")
            .arg(&self.file)
            .args(args)
            .assert()
            .failure()
            .get_output()
            .stderr
            .clone();
        // Log lines may precede the envelope on stderr.
        let stderr = String::from_utf8_lossy(&output);
        let last = stderr.lines().filter(|line| !line.is_empty()).last().unwrap();
        let json: Value = serde_json::from_str(last).expect("Failed to parse JSON error");
        assert!(!json["success"].as_bool().unwrap());
        json
    }

    fn add_lane(&self, name: &str) -> String {
        let lane = self.run(&["swimlane", "add", "--name", name]);
        lane["id"].as_str().unwrap().to_string()
    }

    fn add_card(&self, lane: &str, name: &str) -> String {
        let card = self.run(&["card", "add", "--swimlane-id", lane, "--name", name]);
        card["id"].as_str().unwrap().to_string()
    }

    fn column_id(&self, name: &str) -> String {
        let board = self.run(&["board"]);
        board["swimlanes"][0]["columns"]
            .as_array()
            .unwrap()
            .iter()
            .find(|column| column["column"]["name"] == name)
            .map(|column| column["column"]["id"].as_str().unwrap().to_string())
            .unwrap()
    }
}

/// Runs the binary isolated from the user's config and backend settings.
fn birdseye(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("birdseye").unwrap();
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home)
        .env_remove("BIRDSEYE_URL")
        .env_remove("BIRDSEYE_ANON_KEY")
        .env_remove("BIRDSEYE_ACCESS_TOKEN")
        .env_remove("BIRDSEYE_FILE");
    cmd
}

mod swimlane_tests {
    use super::*;

    #[test]
    fn test_swimlane_add_shows_on_board() {
        let board = Board::new();
        board.add_lane("Web");

        let data = board.run(&["board"]);
        let lanes = data["swimlanes"].as_array().unwrap();
        assert_eq!(lanes.len(), 1);
        assert_eq!(lanes[0]["swimlane"]["name"], "Web");
        let columns: Vec<&str> = lanes[0]["columns"]
            .as_array()
            .unwrap()
            .iter()
            .map(|column| column["column"]["name"].as_str().unwrap())
            .collect();
        assert_eq!(columns, ["Backlog", "In Progress", "Review", "Done"]);
    }

    #[test]
    fn test_swimlane_update_closes_lane() {
        let board = Board::new();
        let lane = board.add_lane("Web");

        let data = board.run(&[
            "swimlane", "update", "--id", &lane, "--name", "Frontend", "--open", "false",
        ]);

        assert_eq!(data["name"], "Frontend");
        assert_eq!(data["is_open"], false);
    }

    #[test]
    fn test_swimlane_delete_refused_with_cards() {
        let board = Board::new();
        let lane = board.add_lane("Web");
        board.add_card(&lane, "Login page");

        let json = board.fail(&["swimlane", "delete", "--id", &lane]);
        assert!(json["error"].as_str().unwrap().contains("still has cards"));
    }

    #[test]
    fn test_swimlane_delete_empty_lane() {
        let board = Board::new();
        let lane = board.add_lane("Web");

        let data = board.run(&["swimlane", "delete", "--id", &lane]);
        assert_eq!(data["deleted"], lane.as_str());

        let data = board.run(&["board"]);
        assert!(data["swimlanes"].as_array().unwrap().is_empty());
    }
}

mod card_tests {
    use super::*;

    #[test]
    fn test_card_add_lands_in_first_column() {
        let board = Board::new();
        let lane = board.add_lane("Web");
        board.add_card(&lane, "Login page");
        board.add_card(&lane, "Signup page");

        let data = board.run(&["board"]);
        let backlog = &data["swimlanes"][0]["columns"][0];
        assert_eq!(backlog["column"]["name"], "Backlog");
        assert_eq!(backlog["items"][0]["name"], "Login page");
        assert_eq!(backlog["items"][1]["name"], "Signup page");
        assert_eq!(data["totals"][0]["count"], 2);
    }

    #[test]
    fn test_card_description_markdown_stored_as_html() {
        let board = Board::new();
        let lane = board.add_lane("Web");

        let card = board.run(&[
            "card",
            "add",
            "--swimlane-id",
            &lane,
            "--name",
            "Login page",
            "--description-md",
            "Use **OAuth**",
        ]);
        assert!(card["description"]
            .as_str()
            .unwrap()
            .contains("<strong>OAuth</strong>"));

        let id = card["id"].as_str().unwrap();
        let fetched = board.run(&["card", "get", "--id", id]);
        assert!(fetched["description_md"]
            .as_str()
            .unwrap()
            .contains("**OAuth**"));
    }

    #[test]
    fn test_card_update_keeps_unset_fields() {
        let board = Board::new();
        let lane = board.add_lane("Web");
        let card = board.add_card(&lane, "Login page");

        board.run(&["card", "update", "--id", &card, "--description-md", "Soon"]);
        let data = board.run(&["card", "update", "--id", &card, "--name", "Login"]);

        assert_eq!(data["name"], "Login");
        assert!(data["description"].as_str().unwrap().contains("Soon"));
    }

    #[test]
    fn test_card_update_rejects_blank_name() {
        let board = Board::new();
        let lane = board.add_lane("Web");
        let card = board.add_card(&lane, "Login page");

        board.fail(&["card", "update", "--id", &card, "--name", "  "]);
    }

    #[test]
    fn test_card_delete_hides_card() {
        let board = Board::new();
        let lane = board.add_lane("Web");
        let card = board.add_card(&lane, "Login page");

        board.run(&["card", "delete", "--id", &card]);

        let data = board.run(&["board"]);
        assert_eq!(data["totals"][0]["count"], 0);
        board.fail(&["card", "get", "--id", &card]);
    }

    #[test]
    fn test_card_move_to_top_of_column() {
        let board = Board::new();
        let lane = board.add_lane("Web");
        let first = board.add_card(&lane, "a");
        let second = board.add_card(&lane, "b");
        let review = board.column_id("Review");

        board.run(&["card", "move", "--id", &first, "--column-id", &review]);
        let moved = board.run(&[
            "card",
            "move",
            "--id",
            &second,
            "--column-id",
            &review,
            "--index",
            "0",
        ]);
        assert_eq!(moved["column_id"], review.as_str());
        assert_eq!(moved["sort_order"], 0);

        let data = board.run(&["board"]);
        let cell = &data["swimlanes"][0]["columns"][2]["items"];
        assert_eq!(cell[0]["name"], "b");
        assert_eq!(cell[1]["name"], "a");
    }

    #[test]
    fn test_card_get_unknown_id() {
        let board = Board::new();
        let json = board.fail(&["card", "get", "--id", "00000000-0000-0000-0000-000000000000"]);
        assert!(json["error"].as_str().unwrap().contains("Not found"));
    }
}

mod board_tests {
    use super::*;

    #[test]
    fn test_board_filter_keeps_totals() {
        let board = Board::new();
        let lane = board.add_lane("Web");
        board.add_card(&lane, "Login page");
        board.add_card(&lane, "Footer");

        let data = board.run(&["board", "--filter", "login"]);

        assert_eq!(data["filter"], "login");
        let items = data["swimlanes"][0]["columns"][0]["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(data["totals"][0]["count"], 2);
    }

    #[test]
    fn test_archive_completed_moves_done_cards_off_board() {
        let board = Board::new();
        let lane = board.add_lane("Web");
        let card = board.add_card(&lane, "Ship it");
        board.add_card(&lane, "Still open");
        let done = board.column_id("Done");
        board.run(&["card", "move", "--id", &card, "--column-id", &done]);

        let data = board.run(&["archive-completed"]);
        assert_eq!(data["archived"], 1);

        let data = board.run(&["board"]);
        assert_eq!(data["totals"][0]["count"], 1);
        assert_eq!(data["totals"][3]["count"], 0);

        let data = board.run(&["archive-completed"]);
        assert_eq!(data["archived"], 0);
    }

    #[test]
    fn test_board_file_is_created() {
        let board = Board::new();
        assert!(!board.file.exists());

        board.run(&["board"]);

        assert!(board.file.exists());
    }
}

mod misc_tests {
    use super::*;

    #[test]
    fn test_memory_backend_starts_empty() {
        let dir = tempdir().unwrap();
        let output = birdseye(dir.path())
            .args(["--memory", "board"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let json: Value = serde_json::from_slice(&output).unwrap();
        assert!(json["data"]["swimlanes"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_missing_backend_config_fails() {
        let dir = tempdir().unwrap();
        birdseye(dir.path())
            .arg("board")
            .assert()
            .failure()
            .stderr(predicate::str::contains("--file or --memory"));
    }

    #[test]
    fn test_completions() {
        let dir = tempdir().unwrap();
        birdseye(dir.path())
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("birdseye"));
    }
}
