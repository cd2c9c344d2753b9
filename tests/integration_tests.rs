#[cfg(test)]
mod config_tests {
    use tempfile::tempdir;
    use valtorix_term::config::Config;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.terminal.enable_tabs);
        assert!(config.terminal.keep_last_session);
        assert_eq!(config.terminal.scrollback_lines, 1000);
        assert_eq!(config.environment.user, "pasante");
    }

    #[test]
    fn test_config_load() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");

        let yaml = r##"
environment:
  user: analyst
  host: blue-team
terminal:
  scrollback_lines: 200
theme:
  error: "#FF0000"
"##;
        std::fs::write(&config_path, yaml).unwrap();

        let loaded = Config::load_from_file(&config_path).unwrap();
        assert_eq!(loaded.environment.user, "analyst");
        assert_eq!(loaded.environment.host, "blue-team");
        assert_eq!(loaded.environment.shell, "bash");
        assert_eq!(loaded.terminal.scrollback_lines, 200);
        assert_eq!(loaded.theme.error, "#FF0000");
    }

    #[test]
    fn test_config_save_and_reload() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("nested").join("config.yaml");

        let mut config = Config::default();
        config.terminal.keep_last_session = false;
        config.keybindings.rename_tab = "F3".to_string();
        config.save_to_file(&config_path).unwrap();

        let loaded = Config::load_from_file(&config_path).unwrap();
        assert!(!loaded.terminal.keep_last_session);
        assert_eq!(loaded.keybindings.rename_tab, "F3");
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("broken.yaml");
        std::fs::write(&config_path, "terminal: [not, a, map]").unwrap();

        assert!(Config::load_from_file(&config_path).is_err());
        assert!(Config::load_from_file(dir.path().join("missing.yaml")).is_err());
    }
}

#[cfg(test)]
mod session_tests {
    use valtorix_term::config::Config;
    use valtorix_term::error::{EXIT_NOT_FOUND, EXIT_OK, EXIT_USAGE};
    use valtorix_term::session::SessionManager;

    #[test]
    fn test_configured_identity_is_local_state() {
        let mut config = Config::default();
        config.environment.user = "trainee".to_string();
        config.environment.host = "lab-01".to_string();
        config.environment.working_dir = "/opt/lab".to_string();

        let mut manager = SessionManager::from_config(&config);
        manager.create_session();
        manager.handle_data("ssh root@target\rexit\r");

        let session = manager.focused().unwrap();
        assert_eq!(session.environment().user, "trainee");
        assert_eq!(session.environment().host, "lab-01");
        assert_eq!(
            session.surface().current_line_text(),
            "trainee@lab-01:/opt/lab$ "
        );
    }

    #[test]
    fn test_exit_codes_in_history() {
        let mut manager = SessionManager::default();
        manager.create_session();
        manager.handle_data("help\rping\rfoobar\r");

        let codes: Vec<i32> = manager
            .focused()
            .unwrap()
            .history()
            .iter()
            .map(|h| h.exit_code)
            .collect();
        assert_eq!(codes, vec![EXIT_OK, EXIT_USAGE, EXIT_NOT_FOUND]);
    }

    #[test]
    fn test_prompt_follows_ssh() {
        let mut manager = SessionManager::default();
        manager.create_session();
        manager.handle_data("ssh alice@bravo\r");

        let session = manager.focused().unwrap();
        assert!(session.is_remote());
        assert_eq!(session.surface().current_line_text(), "alice@bravo:~$ ");
    }

    #[test]
    fn test_pending_line_survives_focus_switch() {
        let mut manager = SessionManager::default();
        let a = manager.create_session();
        manager.handle_data("nmap 10.0");
        let b = manager.create_session();
        manager.handle_data("dig example.org\r");

        manager.focus_session(a);
        assert_eq!(manager.focused().unwrap().pending_input(), "nmap 10.0");
        manager.handle_data(".0.9\r");

        assert_eq!(manager.get(a).unwrap().history()[0].command, "nmap 10.0.0.9");
        assert_eq!(manager.get(b).unwrap().history().len(), 1);
    }

    #[test]
    fn test_scrollback_bound_from_config() {
        let mut config = Config::default();
        config.terminal.scrollback_lines = 5;

        let mut manager = SessionManager::from_config(&config);
        manager.create_session();
        manager.handle_data("help\r");

        assert_eq!(manager.focused().unwrap().surface().line_count(), 5);
    }
}

#[cfg(test)]
mod terminal_tests {
    use valtorix_term::config::Config;
    use valtorix_term::terminal::Terminal;

    #[test]
    fn test_terminal_creation() {
        let terminal = Terminal::new(Config::default());
        assert!(terminal.is_ok());
    }

    #[test]
    fn test_terminal_create_and_drop() {
        for _ in 0..100 {
            let terminal = Terminal::new(Config::default()).unwrap();
            assert_eq!(terminal.manager().len(), 1);
        }
    }
}
