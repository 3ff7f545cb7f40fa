use crate::domain::{Container, ContainerRuntime, ContainerSpec, ContainerState, ExecSpec};
use anyhow::{Result, bail};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::RwLock;

#[derive(Debug, Clone)]
pub struct MockContainerSpec {
    pub name: String,
    pub image: String,
    pub userns: Option<String>,
    pub pid: Option<String>,
    pub ipc: Option<String>,
    pub volumes: Vec<String>,
}

/// In-memory engine that records every call as `operation:argument`.
#[derive(Debug)]
pub struct MockRuntime {
    containers: RwLock<HashMap<String, ContainerState>>,
    images: RwLock<HashSet<String>>,
    runlabel: RwLock<Option<String>>,
    exec_code: RwLock<i32>,
    commands: RwLock<Vec<String>>,
    created: RwLock<Vec<MockContainerSpec>>,
    copied: RwLock<Vec<(String, String)>>,
    execs: RwLock<Vec<ExecSpec>>,
    fail_on: RwLock<Option<String>>,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self {
            containers: RwLock::new(HashMap::new()),
            images: RwLock::new(HashSet::new()),
            runlabel: RwLock::new(None),
            exec_code: RwLock::new(0),
            commands: RwLock::new(Vec::new()),
            created: RwLock::new(Vec::new()),
            copied: RwLock::new(Vec::new()),
            execs: RwLock::new(Vec::new()),
            fail_on: RwLock::new(None),
        }
    }

    pub fn add_container(&self, name: &str, state: ContainerState) {
        self.containers
            .write()
            .unwrap()
            .insert(name.to_string(), state);
    }

    pub fn add_image(&self, image: &str) {
        self.images.write().unwrap().insert(image.to_string());
    }

    pub fn set_runlabel(&self, label: Option<&str>) {
        *self.runlabel.write().unwrap() = label.map(str::to_string);
    }

    pub fn set_exec_code(&self, code: i32) {
        *self.exec_code.write().unwrap() = code;
    }

    pub fn set_fail_on(&self, operation: &str) {
        *self.fail_on.write().unwrap() = Some(operation.to_string());
    }

    pub fn get_commands(&self) -> Vec<String> {
        self.commands.read().unwrap().clone()
    }

    pub fn get_state(&self, name: &str) -> Option<ContainerState> {
        self.containers.read().unwrap().get(name).cloned()
    }

    pub fn created_specs(&self) -> Vec<MockContainerSpec> {
        self.created.read().unwrap().clone()
    }

    /// `(destination, content)` of every file copied into a container.
    pub fn copied_files(&self) -> Vec<(String, String)> {
        self.copied.read().unwrap().clone()
    }

    pub fn exec_specs(&self) -> Vec<ExecSpec> {
        self.execs.read().unwrap().clone()
    }

    fn record_command(&self, cmd: &str) {
        self.commands.write().unwrap().push(cmd.to_string());
    }

    fn check_fail(&self, operation: &str) -> Result<()> {
        if let Some(ref fail_on) = *self.fail_on.read().unwrap() {
            if fail_on == operation {
                bail!("Mock failure on: {}", operation);
            }
        }
        Ok(())
    }
}

impl Default for MockRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerRuntime for MockRuntime {
    fn image_exists(&self, image: &str) -> Result<bool> {
        self.record_command(&format!("image_exists:{}", image));
        self.check_fail("image_exists")?;
        Ok(self.images.read().unwrap().contains(image))
    }

    fn pull_image(&self, image: &str) -> Result<()> {
        self.record_command(&format!("pull:{}", image));
        self.check_fail("pull")?;
        self.add_image(image);
        Ok(())
    }

    fn image_runlabel(&self, image: &str) -> Result<Option<String>> {
        self.record_command(&format!("image_runlabel:{}", image));
        self.check_fail("image_runlabel")?;
        Ok(self.runlabel.read().unwrap().clone())
    }

    fn get_container(&self, name: &str) -> Result<Container> {
        self.record_command(&format!("get_container:{}", name));
        self.check_fail("get_container")?;

        let state = self.get_state(name).unwrap_or(ContainerState::Absent);
        Ok(Container::new(name.to_string(), state))
    }

    fn create_container(&self, spec: &ContainerSpec) -> Result<()> {
        self.record_command(&format!("create:{}", spec.name));
        self.check_fail("create")?;

        self.created.write().unwrap().push(MockContainerSpec {
            name: spec.name.to_string(),
            image: spec.image.to_string(),
            userns: spec.userns.map(str::to_string),
            pid: spec.pid.map(str::to_string),
            ipc: spec.ipc.map(str::to_string),
            volumes: spec.volumes.iter().map(|v| v.to_string()).collect(),
        });
        self.add_container(spec.name, ContainerState::Configured);
        Ok(())
    }

    fn runlabel_container(&self, name: &str, _image: &str) -> Result<()> {
        self.record_command(&format!("runlabel:{}", name));
        self.check_fail("runlabel")?;
        self.add_container(name, ContainerState::Exited);
        Ok(())
    }

    fn start_container(&self, name: &str) -> Result<()> {
        self.record_command(&format!("start:{}", name));
        self.check_fail("start")?;

        if let Some(state) = self.containers.write().unwrap().get_mut(name) {
            *state = ContainerState::Running;
        }
        Ok(())
    }

    fn stop_container(&self, name: &str) -> Result<()> {
        self.record_command(&format!("stop:{}", name));
        self.check_fail("stop")?;

        match self.containers.write().unwrap().get_mut(name) {
            Some(state) => {
                *state = ContainerState::Stopped;
                Ok(())
            }
            None => bail!("no such container: {}", name),
        }
    }

    fn copy_into(&self, container: &str, source: &Path, dest: &str) -> Result<()> {
        self.record_command(&format!("copy:{}:{}", container, dest));
        self.check_fail("copy")?;

        let content = std::fs::read_to_string(source)?;
        self.copied
            .write()
            .unwrap()
            .push((dest.to_string(), content));
        Ok(())
    }

    fn exec_as_root(&self, container: &str, command: &[&str]) -> Result<()> {
        self.record_command(&format!("exec_root:{}:{}", container, command.join(" ")));
        self.check_fail("exec_root")?;
        Ok(())
    }

    fn exec_interactive(&self, spec: &ExecSpec) -> Result<i32> {
        self.record_command(&format!("exec:{}:{}", spec.container, spec.command.join(" ")));
        self.check_fail("exec")?;

        self.execs.write().unwrap().push(spec.clone());
        Ok(*self.exec_code.read().unwrap())
    }

    fn list_containers(&self, filter: &str) -> Result<String> {
        self.record_command(&format!("list:{}", filter));
        self.check_fail("list")?;

        let containers = self.containers.read().unwrap();
        let mut names: Vec<&String> = containers.keys().filter(|n| n.contains(filter)).collect();
        names.sort();

        let mut out = String::from("NAMES\n");
        for name in names {
            out.push_str(name);
            out.push('\n');
        }
        Ok(out)
    }
}
