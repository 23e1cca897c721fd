use mono_typeset::*;

#[test]
fn test_default_settings_are_valid() {
    let settings = Settings::default();
    assert!(settings.validate().is_ok());
    assert_eq!(settings.paragraph_alignment, Alignment::Justify);
    assert!(settings.hyphenate);
}

#[test]
fn test_validation_zero_main_width() {
    let settings = Settings {
        main_width: 0,
        ..Default::default()
    };
    match settings.validate() {
        Err(TypesetError::Config(msg)) => assert!(msg.contains("Main column")),
        _ => panic!("Expected Config error"),
    }
}

#[test]
fn test_no_side_column_is_valid() {
    let settings = Settings {
        side_width: 0,
        ..Default::default()
    };
    assert!(settings.validate().is_ok());
    assert_eq!(
        settings.page_width(),
        Settings::default().page_width() - Settings::default().side_width
    );
}

#[test]
fn test_validation_tab_size() {
    let mut settings = Settings {
        main_width: 20,
        ..Default::default()
    };

    // Valid: quotes keep 12 columns
    settings.tab_size = 4;
    assert!(settings.validate().is_ok());

    // Invalid: no room left between the indents
    settings.tab_size = 10;
    assert!(settings.validate().is_err());

    // Invalid: zero
    settings.tab_size = 0;
    assert!(settings.validate().is_err());
}

#[test]
fn test_validation_margins_leave_content() {
    let settings = Settings {
        page_height: 10,
        margin_top: 5,
        margin_bottom: 5,
        ..Default::default()
    };
    match settings.validate() {
        Err(TypesetError::Config(msg)) => assert!(msg.contains("leaves no rows")),
        _ => panic!("Expected Config error"),
    }
}

#[test]
fn test_page_width_sums_columns_and_margins() {
    let settings = Settings {
        main_width: 50,
        side_width: 20,
        side_spacing: 3,
        margin_inside: 7,
        margin_outside: 5,
        ..Default::default()
    };
    assert_eq!(settings.page_width(), 85);
}

#[tokio::test]
async fn test_settings_roundtrip_through_file() {
    use tempfile::NamedTempFile;

    let settings = Settings {
        main_width: 48,
        paragraph_alignment: Alignment::Center,
        hyphenate: false,
        seed: 99,
        ..Default::default()
    };
    let temp = NamedTempFile::new().unwrap();
    settings.save(temp.path()).await.unwrap();

    let json = std::fs::read_to_string(temp.path()).unwrap();
    assert!(json.contains("\"center\""));

    let loaded = Settings::load(temp.path()).await.unwrap();
    assert_eq!(loaded, settings);
}

#[tokio::test]
async fn test_partial_settings_use_defaults() {
    use tempfile::NamedTempFile;

    let temp = NamedTempFile::new().unwrap();
    std::fs::write(temp.path(), r#"{ "main_width": 30, "page_numbers": false }"#).unwrap();

    let loaded = Settings::load(temp.path()).await.unwrap();
    assert_eq!(loaded.main_width, 30);
    assert!(!loaded.page_numbers);
    assert_eq!(loaded.side_width, Settings::default().side_width);
}

#[tokio::test]
async fn test_malformed_settings_file() {
    use tempfile::NamedTempFile;

    let temp = NamedTempFile::new().unwrap();
    std::fs::write(temp.path(), "not json").unwrap();

    match Settings::load(temp.path()).await {
        Err(TypesetError::Config(msg)) => assert!(msg.contains("Failed to parse")),
        _ => panic!("Expected Config error"),
    }
}
