//! Background thread that owns the SDK. Every blocking chain call happens
//! here so the draw loop never stalls on RPC.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use claim_core::{dispatch_checked, DropSdk, Eligibility, Notification, Query, SdkError, TokenId, Update};

pub enum Request {
    Run(Query),
    Connect,
    Claim {
        quantity: u32,
        eligibility: Eligibility,
    },
}

pub enum Response {
    Update(Update),
    Connected(Result<String, SdkError>),
    /// `None` when the claim was refused before reaching the SDK.
    Claimed {
        quantity: u32,
        notification: Option<Notification>,
    },
}

pub struct Worker {
    requests: Sender<Request>,
    responses: Receiver<Response>,
}

impl Worker {
    pub fn spawn(sdk: Box<dyn DropSdk>, token: TokenId) -> Self {
        let (requests, inbox) = mpsc::channel::<Request>();
        let (outbox, responses) = mpsc::channel::<Response>();
        thread::spawn(move || serve(sdk, token, inbox, outbox));
        Self { requests, responses }
    }

    /// Returns false once the worker thread has gone away.
    pub fn send(&self, request: Request) -> bool {
        self.requests.send(request).is_ok()
    }

    pub fn drain(&self) -> Vec<Response> {
        self.responses.try_iter().collect()
    }
}

fn serve(mut sdk: Box<dyn DropSdk>, token: TokenId, inbox: Receiver<Request>, outbox: Sender<Response>) {
    for request in inbox {
        let response = match request {
            Request::Run(query) => {
                let wallet = sdk.wallet_address();
                Response::Update(query.execute(&sdk, &token, wallet.as_deref()))
            }
            Request::Connect => Response::Connected(sdk.connect_wallet()),
            Request::Claim { quantity, eligibility } => Response::Claimed {
                quantity,
                notification: dispatch_checked(&mut sdk, &token, quantity, &eligibility),
            },
        };
        if outbox.send(response).is_err() {
            break;
        }
    }
    tracing::debug!("worker stopped");
}
