use crate::domain::{FlagOverrides, PrivilegeMode};
use crate::infra::config::default_config_dir;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "petbox",
    version,
    about = "Cria, inicia e entra em um container de estimação via podman"
)]
pub struct Cli {
    /// Diretório de configuração (default: ~/.config/petbox)
    #[arg(long, env = "PETBOX_CONFIG_DIR", default_value_os_t = default_config_dir())]
    pub config_dir: PathBuf,

    /// Roda como root do container (podman via sudo)
    #[arg(long, conflicts_with = "user")]
    pub root: bool,

    /// Roda como o usuário do host (podman rootless)
    #[arg(long)]
    pub user: bool,

    /// Sufixo adicionado ao nome do container
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Nome exato do container (incompatível com --tag)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Registry de onde a imagem é baixada
    #[arg(long)]
    pub registry: Option<String>,

    /// Imagem (relativa ao registry)
    #[arg(long)]
    pub image: Option<String>,

    /// URI completa da imagem, ignora --registry e --image
    #[arg(long)]
    pub image_uri: Option<String>,

    /// Log detalhado
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Lista os containers do petbox
    List,
    /// Só cria (e provisiona) o container
    Create,
    /// Entra no container com o shell configurado
    Enter,
    /// Roda um comando no container (o shell, se nenhum for dado)
    Run {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
}

/// What a parsed command line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    List,
    Create,
    /// Run the given command, or the shell when empty.
    Run(Vec<String>),
}

impl Cli {
    pub fn action(&self) -> Action {
        match &self.command {
            Some(Command::List) => Action::List,
            Some(Command::Create) => Action::Create,
            Some(Command::Enter) | None => Action::Run(Vec::new()),
            Some(Command::Run { command }) => Action::Run(command.clone()),
        }
    }

    /// Bare `petbox` keeps the historical system-wide container; any
    /// subcommand defaults to the rootless one.
    pub fn default_mode(&self) -> PrivilegeMode {
        match self.command {
            None => PrivilegeMode::System,
            Some(_) => PrivilegeMode::User,
        }
    }

    pub fn overrides(&self) -> FlagOverrides {
        let mode = if self.root {
            Some(PrivilegeMode::System)
        } else if self.user {
            Some(PrivilegeMode::User)
        } else {
            None
        };

        FlagOverrides {
            registry: self.registry.clone(),
            image: self.image.clone(),
            image_uri: self.image_uri.clone(),
            name: self.name.clone(),
            tag: self.tag.clone(),
            mode,
        }
    }
}
