#![allow(dead_code)] // Shared across integration tests; each test binary uses a subset of helpers.

use core_braille::{RawTranslation, Translator};
use core_text::BrailleStyle;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use std::sync::{Arc, Mutex};

/// Order in which stub backends resolve, keyed by global call index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Forward,
    Reverse,
    Shuffled,
}

impl Completion {
    fn yields(self, call_index: usize) -> usize {
        match self {
            Completion::Forward => call_index,
            Completion::Reverse => 32 - call_index,
            // distinct for call_index < 11
            Completion::Shuffled => (call_index * 7 + 3) % 11,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub backend: &'static str,
    pub text: String,
    pub styles: Vec<BrailleStyle>,
}

/// Shared log of backend calls (dispatch order) and completions (resolve order).
#[derive(Debug, Default)]
pub struct Recorder {
    pub calls: Mutex<Vec<Call>>,
    pub completions: Mutex<Vec<String>>,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_texts(&self) -> Vec<(&'static str, String)> {
        self.calls().into_iter().map(|c| (c.backend, c.text)).collect()
    }

    pub fn completions(&self) -> Vec<String> {
        self.completions.lock().unwrap().clone()
    }
}

/// One cell per character: the low six bits of the code point OR'ed with
/// `tag`, so cells show which backend produced them.
pub struct StubTranslator {
    pub name: &'static str,
    pub tag: u8,
    pub completion: Completion,
    pub with_mapping: bool,
    pub recorder: Arc<Recorder>,
}

impl StubTranslator {
    pub fn new(name: &'static str, tag: u8, recorder: &Arc<Recorder>) -> Self {
        Self {
            name,
            tag,
            completion: Completion::Forward,
            with_mapping: true,
            recorder: Arc::clone(recorder),
        }
    }

    pub fn completing(mut self, completion: Completion) -> Self {
        self.completion = completion;
        self
    }

    pub fn cells_only(mut self) -> Self {
        self.with_mapping = false;
        self
    }

    pub fn cells_for(&self, text: &str) -> Vec<u8> {
        text.chars().map(|c| (c as u32 as u8 & 0x3f) | self.tag).collect()
    }

    pub fn translate_now(&self, text: &str) -> RawTranslation {
        let cells = self.cells_for(text);
        if !self.with_mapping {
            return RawTranslation::cells_only(cells);
        }
        let identity: Vec<usize> = (0..cells.len()).collect();
        RawTranslation::new(cells, identity.clone(), identity)
    }
}

impl Translator for StubTranslator {
    fn name(&self) -> &str {
        self.name
    }

    fn translate(&self, text: String, styles: Vec<BrailleStyle>) -> BoxFuture<'static, RawTranslation> {
        let index = {
            let mut calls = self.recorder.calls.lock().unwrap();
            calls.push(Call {
                backend: self.name,
                text: text.clone(),
                styles,
            });
            calls.len() - 1
        };
        let yields = self.completion.yields(index);
        let raw = self.translate_now(&text);
        let recorder = Arc::clone(&self.recorder);
        async move {
            for _ in 0..yields {
                tokio::task::yield_now().await;
            }
            recorder.completions.lock().unwrap().push(text);
            raw
        }
        .boxed()
    }
}

/// Contracted-side stub tag and uncontracted-side stub tag.
pub const DEFAULT_TAG: u8 = 0x00;
pub const UNCONTRACTED_TAG: u8 = 0x80;
