use anyhow::Result;
use petbox::cli::Action;
use petbox::cli::run::execute;
use petbox::domain::{ContainerState, HostIdentity, PrivilegeMode, Target};
use petbox::test_support::MockRuntime;
use std::path::PathBuf;
use std::sync::Arc;

const IMAGE: &str = "registry.fedoraproject.org/fedora:latest";

fn host() -> HostIdentity {
    HostIdentity {
        uid: 1000,
        gid: 1000,
        user: "ana".into(),
        group: "ana".into(),
        home: PathBuf::from("/home/ana"),
        cwd: PathBuf::from("/home/ana/work"),
        env: vec![("TERM".into(), "xterm-256color".into())],
    }
}

fn target(name: &str, mode: PrivilegeMode) -> Target {
    Target {
        name: name.into(),
        family: "petbox-ana".into(),
        image: IMAGE.into(),
        mode,
        shell: "/bin/bash".into(),
    }
}

#[test]
fn test_list_queries_engine_once_per_family() -> Result<()> {
    for (name, mode) in [
        ("petbox-ana-user", PrivilegeMode::User),
        ("petbox-ana", PrivilegeMode::System),
    ] {
        let mock = Arc::new(MockRuntime::new());
        mock.add_container("petbox-ana", ContainerState::Exited);
        mock.add_container("petbox-ana-user", ContainerState::Running);

        let code = execute(mock.clone(), &target(name, mode), &host(), Action::List)?;

        assert_eq!(code, 0);
        assert_eq!(mock.get_commands(), vec!["list:petbox-ana"], "{mode:?}");
    }
    Ok(())
}

#[test]
fn test_first_user_run_creates_provisions_and_stops() -> Result<()> {
    let mock = Arc::new(MockRuntime::new());
    let target = target("petbox-ana-user", PrivilegeMode::User);

    let code = execute(mock.clone(), &target, &host(), Action::Run(vec![]))?;
    assert_eq!(code, 0);

    let commands = mock.get_commands();
    assert_eq!(
        commands,
        vec![
            format!("image_exists:{IMAGE}"),
            format!("pull:{IMAGE}"),
            "get_container:petbox-ana-user".to_string(),
            format!("image_runlabel:{IMAGE}"),
            "create:petbox-ana-user".to_string(),
            "get_container:petbox-ana-user".to_string(),
            "start:petbox-ana-user".to_string(),
            "copy:petbox-ana-user:/tmp/petbox-provision-1000.sh".to_string(),
            "exec_root:petbox-ana-user:sh /tmp/petbox-provision-1000.sh".to_string(),
            "exec_root:petbox-ana-user:rm -f /tmp/petbox-provision-1000.sh".to_string(),
            "exec:petbox-ana-user:/bin/bash".to_string(),
            "stop:petbox-ana-user".to_string(),
        ]
    );

    let execs = mock.exec_specs();
    assert_eq!(execs[0].user.as_deref(), Some("1000:1000"));
    assert_eq!(execs[0].workdir, Some(PathBuf::from("/home/ana/work")));
    assert_eq!(
        mock.get_state("petbox-ana-user"),
        Some(ContainerState::Stopped)
    );
    Ok(())
}

#[test]
fn test_existing_system_container_is_started_and_entered() -> Result<()> {
    let mock = Arc::new(MockRuntime::new());
    mock.add_image(IMAGE);
    mock.add_container("petbox-ana", ContainerState::Exited);
    mock.set_exec_code(7);

    let command = vec!["journalctl".to_string(), "-b".to_string()];
    let code = execute(
        mock.clone(),
        &target("petbox-ana", PrivilegeMode::System),
        &host(),
        Action::Run(command),
    )?;

    assert_eq!(code, 7, "exit code of the in-container command is propagated");

    let commands = mock.get_commands();
    assert!(commands.contains(&"start:petbox-ana".to_string()));
    assert!(commands.contains(&"exec:petbox-ana:journalctl -b".to_string()));
    assert!(!commands.iter().any(|c| c.starts_with("create:")));
    assert!(!commands.iter().any(|c| c.starts_with("copy:")));
    assert_eq!(mock.exec_specs()[0].user, None);
    Ok(())
}

#[test]
fn test_create_does_not_exec() -> Result<()> {
    let mock = Arc::new(MockRuntime::new());
    mock.add_image(IMAGE);

    let code = execute(
        mock.clone(),
        &target("petbox-ana-user", PrivilegeMode::User),
        &host(),
        Action::Create,
    )?;

    assert_eq!(code, 0);
    let commands = mock.get_commands();
    assert!(commands.contains(&"create:petbox-ana-user".to_string()));
    assert!(!commands.iter().any(|c| c.starts_with("exec:")));
    assert_eq!(commands.last().map(String::as_str), Some("stop:petbox-ana-user"));
    Ok(())
}

#[test]
fn test_run_label_container_is_entered() -> Result<()> {
    let mock = Arc::new(MockRuntime::new());
    mock.add_image(IMAGE);
    mock.set_runlabel(Some("podman run -d --name NAME IMAGE"));

    let code = execute(
        mock.clone(),
        &target("petbox-ana-user", PrivilegeMode::User),
        &host(),
        Action::Run(vec!["id".to_string()]),
    )?;

    assert_eq!(code, 0);
    let commands = mock.get_commands();
    let position = |wanted: &str| commands.iter().position(|c| c == wanted);

    let runlabel = position("runlabel:petbox-ana-user").expect("runlabel issued");
    let start = position("start:petbox-ana-user").expect("container started");
    let exec = position("exec:petbox-ana-user:id").expect("command executed");
    assert!(runlabel < start && start < exec);

    assert!(!commands.iter().any(|c| c.starts_with("create:")));
    assert!(mock.copied_files().is_empty());
    assert_eq!(
        commands.last().map(String::as_str),
        Some("stop:petbox-ana-user")
    );
    Ok(())
}

#[test]
fn test_failed_create_still_stops() {
    let mock = Arc::new(MockRuntime::new());
    mock.add_image(IMAGE);
    mock.set_fail_on("create");

    let result = execute(
        mock.clone(),
        &target("petbox-ana", PrivilegeMode::System),
        &host(),
        Action::Run(vec![]),
    );

    let err = result.unwrap_err();
    assert!(format!("{err:#}").contains("falha ao criar o container 'petbox-ana'"));
    assert_eq!(
        mock.get_commands().last().map(String::as_str),
        Some("stop:petbox-ana")
    );
}

#[test]
fn test_unknown_state_aborts_before_exec() {
    let mock = Arc::new(MockRuntime::new());
    mock.add_image(IMAGE);
    mock.add_container("petbox-ana", ContainerState::Unknown("paused".into()));

    let result = execute(
        mock.clone(),
        &target("petbox-ana", PrivilegeMode::System),
        &host(),
        Action::Run(vec![]),
    );

    assert!(result.is_err());
    assert!(!mock.get_commands().iter().any(|c| c.starts_with("exec:")));
}
