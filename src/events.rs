use std::io;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use unsegen::input::Input;

use crate::backup;
use crate::config::Config;
use crate::error::Result;

pub enum Event {
    Input(Input),
    Update,
    ImportLoaded(PathBuf, Result<String>),
}

pub struct Dispatcher {
    rx: mpsc::Receiver<Event>,
    tx: mpsc::Sender<Event>,
    _input_handle: thread::JoinHandle<()>,
    _update_handle: thread::JoinHandle<()>,
}

impl Dispatcher {
    pub fn from_config(config: &Config) -> Dispatcher {
        let tick_rate = config.tick_rate();
        let (tx, rx) = mpsc::channel();
        let input_handle = {
            let tx = tx.clone();
            thread::spawn(move || {
                let stdin = io::stdin();
                let stdin = stdin.lock();
                for evt in Input::read_all(stdin) {
                    match evt {
                        Ok(key) => {
                            if tx.send(Event::Input(key)).is_err() {
                                return;
                            }
                        }
                        Err(e) => log::warn!("Error reading input: {}", e),
                    }
                }
            })
        };
        let tx_upd = tx.clone();
        let update_handle = {
            thread::spawn(move || loop {
                if tx_upd.send(Event::Update).is_err() {
                    return;
                }
                thread::sleep(tick_rate);
            })
        };
        Dispatcher {
            rx,
            tx,
            _input_handle: input_handle,
            _update_handle: update_handle,
        }
    }

    pub fn next(&self) -> std::result::Result<Event, mpsc::RecvError> {
        self.rx.recv()
    }

    pub fn event_sink(&self) -> &mpsc::Sender<Event> {
        &self.tx
    }
}

/// Reads `path` off the UI thread and reports the contents back through
/// `sink` once done.
pub fn spawn_import(path: PathBuf, sink: mpsc::Sender<Event>) {
    let spawned = thread::Builder::new()
        .name("shiftcal-import".to_owned())
        .spawn(move || {
            let contents = backup::read_import_file(&path);
            if sink.send(Event::ImportLoaded(path, contents)).is_err() {
                log::warn!("Import finished after the event loop stopped");
            }
        });

    if let Err(e) = spawned {
        log::error!("Could not start import: {}", e);
    }
}
