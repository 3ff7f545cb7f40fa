use anyhow::Result;
use clap::Parser;
use petbox::UsageError;
use petbox::cli::{Action, Cli};
use petbox::domain::PrivilegeMode;
use petbox::infra::config::{CONFIG_FILE_NAME, load_settings_from};
use std::fs;

fn cli(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("petbox").chain(args.iter().copied())).unwrap()
}

#[test]
fn test_each_layer_overrides_the_previous() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let file = temp.path().join(CONFIG_FILE_NAME);
    fs::write(
        &file,
        r#"
registry = "quay.io"
image = "toolbx/fedora:40"
name = "sandbox"
"#,
    )?;

    let settings = load_settings_from(&[file], "ana")?;

    // defaults < file
    assert_eq!(settings.shell, "/bin/bash");
    assert_eq!(settings.registry, "quay.io");

    // file < flags
    let cli = cli(&["--image", "toolbx/fedora:41", "enter"]);
    let target = settings.resolve(&cli.overrides(), cli.default_mode())?;

    assert_eq!(target.image, "quay.io/toolbx/fedora:41");
    assert_eq!(target.name, "sandbox-user");
    Ok(())
}

#[test]
fn test_name_with_tag_is_usage_error() {
    let settings = petbox::Settings::defaults("ana");

    for args in [
        &["-n", "box", "-t", "dev"][..],
        &["-n", "box", "-t", "dev", "list"][..],
        &["--root", "-n", "box", "-t", "dev", "run", "id"][..],
    ] {
        let cli = cli(args);
        let err = settings
            .resolve(&cli.overrides(), cli.default_mode())
            .unwrap_err();
        assert!(err.downcast_ref::<UsageError>().is_some());
    }
}

#[test]
fn test_bare_invocation_equals_run_without_arguments() -> Result<()> {
    let settings = petbox::Settings::defaults("ana");
    let bare = cli(&[]);
    let run = cli(&["--root", "run"]);

    assert_eq!(bare.action(), run.action());
    assert_eq!(bare.action(), Action::Run(vec![]));

    let bare_target = settings.resolve(&bare.overrides(), bare.default_mode())?;
    let run_target = settings.resolve(&run.overrides(), run.default_mode())?;
    assert_eq!(bare_target, run_target);
    assert_eq!(bare_target.mode, PrivilegeMode::System);
    Ok(())
}

#[test]
fn test_user_mode_suffix_and_tag() -> Result<()> {
    let settings = petbox::Settings::defaults("ana");

    let user = cli(&["-t", "rust", "enter"]);
    let target = settings.resolve(&user.overrides(), user.default_mode())?;
    assert_eq!(target.name, "petbox-ana-user-rust");

    let system = cli(&["-t", "rust"]);
    let target = settings.resolve(&system.overrides(), system.default_mode())?;
    assert_eq!(target.name, "petbox-ana-rust");

    let named = cli(&["--user", "-n", "scratch"]);
    let target = settings.resolve(&named.overrides(), named.default_mode())?;
    assert_eq!(target.name, "scratch");
    Ok(())
}
