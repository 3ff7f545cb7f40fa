use crate::domain::HostIdentity;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Renders the one-shot script that makes the host user usable inside a
/// fresh container: matching group and user, `sudo` installed, and a
/// passwordless sudoers drop-in.
pub fn render_script(host: &HostIdentity, shell: &str) -> String {
    let user = shell_words::quote(&host.user);
    let group = shell_words::quote(&host.group);
    let home = shell_words::quote(host.home.to_str().unwrap_or("/"));
    let shell = shell_words::quote(shell);
    let uid = host.uid;
    let gid = host.gid;

    format!(
        r#"#!/bin/sh
set -e

if ! getent group {gid} >/dev/null 2>&1; then
    groupadd --gid {gid} {group}
fi

if ! getent passwd {uid} >/dev/null 2>&1; then
    useradd --uid {uid} --gid {gid} --home-dir {home} --no-create-home --shell {shell} {user}
fi

if ! command -v sudo >/dev/null 2>&1; then
    if command -v dnf >/dev/null 2>&1; then
        dnf -y install sudo
    elif command -v yum >/dev/null 2>&1; then
        yum -y install sudo
    elif command -v apt-get >/dev/null 2>&1; then
        apt-get update && apt-get -y install sudo
    elif command -v apk >/dev/null 2>&1; then
        apk add --no-cache sudo
    else
        echo "petbox: nenhum gerenciador de pacotes para instalar sudo" >&2
        exit 1
    fi
fi

mkdir -p /etc/sudoers.d
printf '%s ALL=(ALL) NOPASSWD: ALL\n' {user} > /etc/sudoers.d/petbox-{uid}
chmod 0440 /etc/sudoers.d/petbox-{uid}
"#
    )
}

/// The provisioning script staged on the host, ready to be copied in.
pub struct ProvisionScript {
    file: NamedTempFile,
    container_path: String,
}

impl ProvisionScript {
    pub fn write(host: &HostIdentity, shell: &str) -> Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("petbox-provision-")
            .suffix(".sh")
            .tempfile()
            .context("criando script de provisionamento")?;

        file.write_all(render_script(host, shell).as_bytes())
            .and_then(|_| file.flush())
            .context("escrevendo script de provisionamento")?;

        Ok(Self {
            file,
            container_path: format!("/tmp/petbox-provision-{}.sh", host.uid),
        })
    }

    pub fn host_path(&self) -> &Path {
        self.file.path()
    }

    pub fn container_path(&self) -> &str {
        &self.container_path
    }
}
