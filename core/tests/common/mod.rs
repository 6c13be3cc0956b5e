//! Scripted in-memory transport shared by the store and screen tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use animal_core::{
    Animal, AnimalApi, AnimalClient, AnimalStore, ApiError, ErrorPolicy, HttpRequest, HttpResponse,
    Prompt, Transport,
};

pub const BASE_URL: &str = "http://animals.test";

enum Reply {
    Respond(HttpResponse),
    Fail,
    Gated(mpsc::Receiver<HttpResponse>),
}

#[derive(Default)]
struct Script {
    replies: VecDeque<Reply>,
    requests: Vec<HttpRequest>,
}

/// Answers requests from a queue, in call order, and records every request.
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<Script>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, status: u16, body: impl Into<String>) {
        self.push(Reply::Respond(HttpResponse::new(status, body)));
    }

    pub fn reply_list(&self, animals: &[Animal]) {
        self.reply(200, serde_json::to_string(animals).unwrap());
    }

    /// Next request fails without a response, like a refused connection.
    pub fn fail(&self) {
        self.push(Reply::Fail);
    }

    /// Next request blocks until the returned sender delivers its response.
    pub fn gate(&self) -> mpsc::Sender<HttpResponse> {
        let (tx, rx) = mpsc::channel();
        self.push(Reply::Gated(rx));
        tx
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.script.lock().unwrap().requests.clone()
    }

    pub fn store(self: &Arc<Self>, policy: ErrorPolicy) -> Arc<AnimalStore> {
        let transport: Arc<dyn Transport> = Arc::clone(self) as Arc<dyn Transport>;
        let api = AnimalApi::new(AnimalClient::new(BASE_URL), transport);
        Arc::new(AnimalStore::new(api, policy))
    }

    /// Poll until at least `count` requests have reached the transport.
    pub async fn wait_for_requests(&self, count: usize) {
        for _ in 0..400 {
            if self.script.lock().unwrap().requests.len() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("timed out waiting for {count} requests");
    }

    fn push(&self, reply: Reply) {
        self.script.lock().unwrap().replies.push_back(reply);
    }
}

impl Transport for ScriptedTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let reply = {
            let mut script = self.script.lock().unwrap();
            script.requests.push(request);
            script.replies.pop_front()
        };
        match reply {
            Some(Reply::Respond(response)) => Ok(response),
            Some(Reply::Gated(rx)) => rx
                .recv()
                .map_err(|_| ApiError::Transport("gate dropped".to_string())),
            Some(Reply::Fail) => Err(ApiError::Transport("connection refused".to_string())),
            None => Err(ApiError::Transport("no scripted reply".to_string())),
        }
    }
}

/// Prompt that answers from a script and records what it was told.
#[derive(Default)]
pub struct ScriptedPrompt {
    pub answers: VecDeque<Option<String>>,
    pub notices: Vec<String>,
}

impl ScriptedPrompt {
    pub fn answering(answers: &[Option<&str>]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.map(str::to_string)).collect(),
            notices: Vec::new(),
        }
    }
}

impl Prompt for ScriptedPrompt {
    fn ask(&mut self, _label: &str, _initial: &str) -> Option<String> {
        self.answers.pop_front().flatten()
    }

    fn notify(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }
}

pub fn cat_and_dog() -> Vec<Animal> {
    vec![Animal::new(1, "Cat"), Animal::new(2, "Dog")]
}
