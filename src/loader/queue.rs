// Background loads: requests go out to the runtime, completions come back
// over a channel and are drained on the event-loop thread

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};

use tokio::runtime::Handle;

use crate::error::LoadError;
use crate::loader::AssetLoader;
use crate::model::LoadedModel;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub generation: u64,
    pub path: String,
    pub auto_play_first: bool,
}

#[derive(Debug)]
pub struct LoadCompletion {
    pub generation: u64,
    pub path: String,
    pub result: Result<LoadedModel, LoadError>,
}

pub trait LoadQueue {
    fn submit(&mut self, request: LoadRequest);

    /// Every completion that has arrived since the last drain, oldest first.
    fn drain(&mut self) -> Vec<LoadCompletion>;
}

pub struct AsyncLoadQueue<L: AssetLoader> {
    loader: Arc<L>,
    runtime: Handle,
    sender: Sender<LoadCompletion>,
    receiver: Receiver<LoadCompletion>,
}

impl<L: AssetLoader> AsyncLoadQueue<L> {
    pub fn new(loader: L, runtime: Handle) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            loader: Arc::new(loader),
            runtime,
            sender,
            receiver,
        }
    }
}

impl<L: AssetLoader> LoadQueue for AsyncLoadQueue<L> {
    fn submit(&mut self, request: LoadRequest) {
        let loader = Arc::clone(&self.loader);
        let sender = self.sender.clone();

        self.runtime.spawn(async move {
            log::info!("loading {} (#{})", request.path, request.generation);
            let result = loader.load(&request.path).await;
            let completion = LoadCompletion {
                generation: request.generation,
                path: request.path,
                result,
            };
            if sender.send(completion).is_err() {
                log::debug!("load finished after the queue was dropped");
            }
        });
    }

    fn drain(&mut self) -> Vec<LoadCompletion> {
        self.receiver.try_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    struct NamedLoader;

    impl AssetLoader for NamedLoader {
        async fn load(&self, path: &str) -> Result<LoadedModel, LoadError> {
            if path.ends_with("missing.fbx") {
                return Err(LoadError::Parse("no such asset".into()));
            }
            Ok(LoadedModel::new(path))
        }
    }

    async fn drain_until(queue: &mut AsyncLoadQueue<NamedLoader>, count: usize) -> Vec<LoadCompletion> {
        let mut done = Vec::new();
        for _ in 0..200 {
            done.extend(queue.drain());
            if done.len() >= count {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        done
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn completions_carry_generation_and_result() {
        let mut queue = AsyncLoadQueue::new(NamedLoader, Handle::current());
        queue.submit(LoadRequest {
            generation: 1,
            path: "a.fbx".into(),
            auto_play_first: true,
        });
        queue.submit(LoadRequest {
            generation: 2,
            path: "missing.fbx".into(),
            auto_play_first: true,
        });

        let mut done = drain_until(&mut queue, 2).await;
        done.sort_by_key(|c| c.generation);
        assert_eq!(done.len(), 2);
        assert_eq!(done[0].path, "a.fbx");
        assert_eq!(done[0].result.as_ref().map(|m| m.name.as_str()).ok(), Some("a.fbx"));
        assert!(matches!(done[1].result, Err(LoadError::Parse(_))));
        assert!(queue.drain().is_empty());
    }
}
