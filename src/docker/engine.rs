/*!
Docker Engine API backend.

Lifecycle:
- create the container; on "No such image" pull it and create again
- attach stdin/stdout/stderr, copy container output to the host, start the container
- stdin on a terminal: raw mode, byte-for-byte forwarding, Ctrl-C (0x03) force-removes the container
- stdin not on a terminal: forward until EOF, then close the container's stdin; SIGINT force-removes the container
- wait for "not-running", remove the container, forward its exit status
*/
use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bollard::container::{
    AttachContainerOptions, AttachContainerResults, Config, CreateContainerOptions, LogOutput,
    RemoveContainerOptions, StartContainerOptions, WaitContainerOptions,
};
use bollard::image::CreateImageOptions;
use bollard::models::{ContainerWaitResponse, CreateImageInfo, HostConfig};
use bollard::Docker;
use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::terminal::RawTerminal;
use super::{LaunchPlan, CONTAINER_WORKDIR};
use crate::errors::LauncherError;

const CTRL_C: u8 = 3;
/// Exit status reported when the container was removed on user interrupt.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;
const OUTPUT_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Split an image reference into (`from_image`, `tag`) for a pull; untagged refs pull `latest`.
pub fn split_image_ref(image: &str) -> (String, String) {
    if image.contains('@') {
        return (image.to_string(), String::new());
    }
    let name_start = image.rfind('/').map(|i| i + 1).unwrap_or(0);
    match image[name_start..].rfind(':') {
        Some(i) => {
            let at = name_start + i;
            (image[..at].to_string(), image[at + 1..].to_string())
        }
        None => (image.to_string(), "latest".to_string()),
    }
}

pub fn is_no_such_image(e: &bollard::errors::Error) -> bool {
    match e {
        bollard::errors::Error::DockerResponseServerError { message, .. } => {
            message.contains("No such image")
        }
        _ => false,
    }
}

fn container_config(plan: &LaunchPlan) -> Config<String> {
    Config {
        attach_stdin: Some(true),
        attach_stdout: Some(true),
        attach_stderr: Some(true),
        tty: Some(plan.tty),
        open_stdin: Some(true),
        // Piped stdin: the daemon closes the container's stdin once the attach stream ends
        stdin_once: Some(!plan.tty),
        env: Some(plan.env_strings()),
        cmd: if plan.args.is_empty() {
            None
        } else {
            Some(plan.args.clone())
        },
        image: Some(plan.image.clone()),
        working_dir: Some(CONTAINER_WORKDIR.to_string()),
        entrypoint: Some(vec![plan.entrypoint.clone()]),
        host_config: Some(HostConfig {
            binds: Some(plan.binds()),
            extra_hosts: Some(vec![plan.extra_host()]),
            ..Default::default()
        }),
        ..Default::default()
    }
}

async fn try_create(docker: &Docker, plan: &LaunchPlan) -> Result<String, bollard::errors::Error> {
    let resp = docker
        .create_container(
            Some(CreateContainerOptions {
                name: plan.container_name.clone(),
                platform: None,
            }),
            container_config(plan),
        )
        .await?;
    for w in &resp.warnings {
        warn!("docker: {w}");
    }
    Ok(resp.id)
}

fn print_pull_progress(info: &CreateImageInfo) {
    let mut line = String::new();
    if let Some(id) = &info.id {
        line.push_str(id);
        line.push_str(": ");
    }
    if let Some(status) = &info.status {
        line.push_str(status);
    }
    if let Some(progress) = &info.progress {
        line.push(' ');
        line.push_str(progress);
    }
    if !line.is_empty() {
        println!("{line}");
    }
}

pub async fn pull_image(docker: &Docker, image: &str) -> Result<(), LauncherError> {
    println!("Pulling \"{image}\" image from registry");
    let (from_image, tag) = split_image_ref(image);
    let mut stream = docker.create_image(
        Some(CreateImageOptions {
            from_image,
            tag,
            ..Default::default()
        }),
        None,
        None,
    );
    while let Some(item) = stream.next().await {
        match item {
            Ok(info) => print_pull_progress(&info),
            Err(e) => {
                println!("Error pulling \"{image}\" image from registry");
                return Err(e.into());
            }
        }
    }
    Ok(())
}

/// Create the launcher container, pulling the image first if the daemon does not have it.
pub async fn container_create(docker: &Docker, plan: &LaunchPlan) -> Result<String, LauncherError> {
    match try_create(docker, plan).await {
        Ok(id) => Ok(id),
        Err(e) if is_no_such_image(&e) => {
            info!(image = %plan.image, "image not present locally");
            pull_image(docker, &plan.image).await?;
            try_create(docker, plan).await.map_err(|e| {
                println!("Error creating launcher container");
                e.into()
            })
        }
        Err(e) => {
            println!("Error creating launcher container");
            Err(e.into())
        }
    }
}

async fn force_remove(docker: &Docker, id: &str) {
    let opts = RemoveContainerOptions {
        force: true,
        ..Default::default()
    };
    if let Err(e) = docker.remove_container(id, Some(opts)).await {
        debug!("docker remove {id}: {e}");
    }
}

/// Read host stdin on a plain thread; tokio's stdin would pin a blocking-pool worker at shutdown.
fn spawn_stdin_reader(tx: mpsc::UnboundedSender<Vec<u8>>) {
    std::thread::spawn(move || {
        let mut stdin = io::stdin();
        let mut buf = [0u8; 1024];
        loop {
            match stdin.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    if tx.send(buf[..n].to_vec()).is_err() {
                        break;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(_) => break,
            }
        }
    });
}

/// Exit status carried by the first item of a wait stream.
pub fn exit_from_wait(
    item: Option<Result<ContainerWaitResponse, bollard::errors::Error>>,
) -> Result<i64, LauncherError> {
    match item {
        Some(Ok(resp)) => Ok(resp.status_code),
        Some(Err(bollard::errors::Error::DockerContainerWaitError { code, .. })) => Ok(code),
        Some(Err(e)) => Err(e.into()),
        None => Err(LauncherError::Docker(
            "wait stream ended without an exit status".to_string(),
        )),
    }
}

/// Exit code to forward: an interrupt wins over whatever the wait reported.
pub fn resolve_exit(
    waited: Result<i64, LauncherError>,
    interrupted: bool,
) -> Result<i32, LauncherError> {
    if interrupted {
        return Ok(INTERRUPTED_EXIT_CODE);
    }
    waited.map(|code| code as i32)
}

async fn wait_exit_code(docker: &Docker, id: &str) -> Result<i64, LauncherError> {
    let mut stream = docker.wait_container(
        id,
        Some(WaitContainerOptions {
            condition: "not-running",
        }),
    );
    exit_from_wait(stream.next().await)
}

async fn run_attached(plan: &LaunchPlan) -> Result<i32, LauncherError> {
    let docker = Docker::connect_with_local_defaults()?;
    let id = container_create(&docker, plan).await?;
    debug!(container = %id, "container created");

    let AttachContainerResults { mut output, mut input } = docker
        .attach_container(
            &id,
            Some(AttachContainerOptions::<String> {
                stdin: Some(true),
                stdout: Some(true),
                stderr: Some(true),
                stream: Some(true),
                ..Default::default()
            }),
        )
        .await?;

    let out_task = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        let mut stderr = tokio::io::stderr();
        while let Some(Ok(chunk)) = output.next().await {
            let res = match chunk {
                LogOutput::StdErr { message } => {
                    let r = stderr.write_all(&message).await;
                    let _ = stderr.flush().await;
                    r
                }
                LogOutput::StdOut { message }
                | LogOutput::Console { message }
                | LogOutput::StdIn { message } => {
                    let r = stdout.write_all(&message).await;
                    let _ = stdout.flush().await;
                    r
                }
            };
            if res.is_err() {
                break;
            }
        }
    });

    if let Err(e) = docker
        .start_container(&id, None::<StartContainerOptions<String>>)
        .await
    {
        force_remove(&docker, &id).await;
        return Err(e.into());
    }
    info!(container = %plan.container_name, image = %plan.image, "container started");

    let interrupted = Arc::new(AtomicBool::new(false));
    let _raw = if plan.tty {
        match RawTerminal::enter() {
            Ok(raw) => Some(raw),
            Err(e) => {
                force_remove(&docker, &id).await;
                return Err(e.into());
            }
        }
    } else {
        None
    };

    let (tx, mut rx) = mpsc::unbounded_channel::<Vec<u8>>();
    spawn_stdin_reader(tx);
    {
        let docker = docker.clone();
        let id = id.clone();
        let interrupted = interrupted.clone();
        let watch_ctrl_c = plan.tty;
        tokio::spawn(async move {
            while let Some(buf) = rx.recv().await {
                if watch_ctrl_c && buf.contains(&CTRL_C) && !interrupted.swap(true, Ordering::SeqCst)
                {
                    let docker = docker.clone();
                    let id = id.clone();
                    tokio::spawn(async move { force_remove(&docker, &id).await });
                }
                if input.write_all(&buf).await.is_err() {
                    break;
                }
                let _ = input.flush().await;
            }
            // Host stdin reached EOF: half-close so the container sees end-of-input
            let _ = input.shutdown().await;
        });
    }
    {
        let docker = docker.clone();
        let id = id.clone();
        let interrupted = interrupted.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() && !interrupted.swap(true, Ordering::SeqCst) {
                force_remove(&docker, &id).await;
            }
        });
    }

    let waited = wait_exit_code(&docker, &id).await;
    let _ = tokio::time::timeout(OUTPUT_DRAIN_TIMEOUT, out_task).await;

    force_remove(&docker, &id).await;
    let code = resolve_exit(waited, interrupted.load(Ordering::SeqCst))?;
    debug!(code, "container finished");
    Ok(code)
}

/// Run the launcher container through the Engine API; returns the container's exit code.
pub fn run_engine(plan: &LaunchPlan) -> Result<i32, LauncherError> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("pz-engine")
        .build()?;
    let code = rt.block_on(run_attached(plan));
    rt.shutdown_timeout(Duration::from_millis(200));
    code
}
