// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Path keyed trees, and patterns reading keys along such a tree.
//!
//! A [TriePattern](TriePattern) follows the tree one token at a
//! time, as long as there is a route for the current token, then
//! resolves to the value at the node reached. What happens when that
//! node has no value (or, for greedy matching, also when it has one)
//! is decided by a [MatchPolicy](MatchPolicy):
//!
//! * [Exact](Exact): not parsed.
//! * [Lazy](Lazy): classify the text walked so far, and if that
//!   gives a value, register it under that path for the next time.
//! * [Greedy](Greedy): words that merely start with a key are read
//!   whole, as a fresh value that isn't registered.
//!
//! All state of one read (the path walked) is local to the call.
//! Registering keys goes through `&self`, hence patterns can be
//! extended while shared by a grammar.

use crate::error::{End, ParseError, ReadResult, ShowError, ShowResult};
use crate::feed::{Feed, FeedExt};
use crate::pattern::{Output, Pattern};
use kstring::KString;
use std::cell::{Ref, RefCell};
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::hash::Hash;

#[derive(Debug, Clone, PartialEq)]
pub struct Trie<K: Hash + Eq, V> {
    value: Option<V>,
    routes: HashMap<K, Trie<K, V>>,
}

impl<K: Hash + Eq, V> Default for Trie<K, V> {
    fn default() -> Self {
        Trie { value: None, routes: HashMap::new() }
    }
}

impl<K: Hash + Eq + Clone, V> Trie<K, V> {
    pub fn new() -> Trie<K, V> {
        Trie::default()
    }

    pub fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    pub fn routes(&self) -> &HashMap<K, Trie<K, V>> {
        &self.routes
    }

    /// The child at `key`.
    pub fn route(&self, key: &K) -> Option<&Trie<K, V>> {
        self.routes.get(key)
    }

    pub fn get_path<'k>(&self, path: impl IntoIterator<Item = &'k K>) -> Option<&Trie<K, V>>
        where K: 'k
    {
        let mut node = self;
        for k in path {
            node = node.routes.get(k)?;
        }
        Some(node)
    }

    pub fn get_or_create_path(&mut self, path: impl IntoIterator<Item = K>) -> &mut Trie<K, V> {
        let mut node = self;
        for k in path {
            node = node.routes.entry(k).or_default();
        }
        node
    }

    pub fn get<'k>(&self, path: impl IntoIterator<Item = &'k K>) -> Option<&V>
        where K: 'k
    {
        self.get_path(path)?.value.as_ref()
    }

    pub fn contains<'k>(&self, path: impl IntoIterator<Item = &'k K>) -> bool
        where K: 'k
    {
        self.get(path).is_some()
    }

    /// Returns the value previously at `path`.
    pub fn insert(&mut self, path: impl IntoIterator<Item = K>, value: V) -> Option<V> {
        self.get_or_create_path(path).value.replace(value)
    }

    pub fn merge<P: IntoIterator<Item = K>>(&mut self, entries: impl IntoIterator<Item = (P, V)>) {
        for (path, value) in entries {
            self.insert(path, value);
        }
    }

    /// The paths of all values.
    pub fn collect_keys(&self) -> Vec<Vec<K>> {
        let mut keys = Vec::new();
        if self.value.is_some() {
            keys.push(Vec::new());
        }
        for (k, child) in &self.routes {
            for mut rest in child.collect_keys() {
                rest.insert(0, k.clone());
                keys.push(rest);
            }
        }
        keys
    }
}

fn single_char(mut chars: impl Iterator<Item = char>) -> Option<char> {
    let c = chars.next()?;
    if chars.next().is_none() { Some(c) } else { None }
}

impl<V: Clone> Trie<char, V> {
    pub fn insert_str(&mut self, key: &str, value: V) -> Option<V> {
        self.insert(key.chars(), value)
    }

    /// Registers `value` under all upper/lower case spellings of
    /// `key`. Returns the values replaced, with their paths.
    pub fn insert_nocase(&mut self, key: &str, value: V) -> Vec<(Vec<char>, V)> {
        let chars: Vec<char> = key.chars().collect();
        let mut replaced = Vec::new();
        self.insert_nocase_at(&chars, &value, &mut Vec::new(), &mut replaced);
        replaced
    }

    fn insert_nocase_at(&mut self, chars: &[char], value: &V,
                        path: &mut Vec<char>, replaced: &mut Vec<(Vec<char>, V)>) {
        match chars.split_first() {
            None =>
                if let Some(old) = self.value.replace(value.clone()) {
                    replaced.push((path.clone(), old));
                },
            Some((c, rest)) => {
                let mut variants = vec![*c];
                for v in [single_char(c.to_lowercase()), single_char(c.to_uppercase())]
                    .into_iter().flatten()
                {
                    if !variants.contains(&v) {
                        variants.push(v);
                    }
                }
                for v in variants {
                    path.push(v);
                    self.routes.entry(v).or_default()
                        .insert_nocase_at(rest, value, path, replaced);
                    path.pop();
                }
            }
        }
    }
}

/// The tokens consumed while walking the trie, in one read.
#[derive(Debug, Clone, PartialEq)]
pub struct Walk<K> {
    pub path: Vec<K>,
    /// The input ended during the walk.
    pub at_end: bool,
}

pub enum Resolution<V> {
    NotParsed,
    Found(V),
    /// Register under the walked path, and read.
    Memoize(V),
    /// Read, without registering.
    Fresh(V),
}

pub trait MatchPolicy<K: Hash + Eq, V> {
    fn on_success(&self, _s: &mut dyn Feed<K>, _walk: &Walk<K>, _trie: &Trie<K, V>, value: V)
                  -> Result<Resolution<V>, ParseError> {
        Ok(Resolution::Found(value))
    }

    fn on_fail(&self, _s: &mut dyn Feed<K>, _walk: &Walk<K>, _trie: &Trie<K, V>)
               -> Result<Resolution<V>, ParseError> {
        Ok(Resolution::NotParsed)
    }

    /// Show a value that has no registered path.
    fn show_unregistered(&self, _s: &mut dyn Output<K>, _value: &V) -> ShowResult {
        Err(ShowError::NotRegistered)
    }

    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Exact;

impl<K: Hash + Eq, V> MatchPolicy<K, V> for Exact {
    fn name(&self) -> &'static str {
        "exact"
    }
}

pub struct Lazy<F> {
    classify: F,
}

impl<F> Lazy<F> {
    pub fn new(classify: F) -> Lazy<F> {
        Lazy { classify }
    }
}

impl<V: Debug, F: Fn(&str) -> Option<V>> MatchPolicy<char, V> for Lazy<F> {
    fn on_fail(&self, _s: &mut dyn Feed<char>, walk: &Walk<char>, _trie: &Trie<char, V>)
               -> Result<Resolution<V>, ParseError> {
        if walk.path.is_empty() {
            return Ok(Resolution::NotParsed)
        }
        let text: String = walk.path.iter().collect();
        match (self.classify)(&text) {
            Some(v) => {
                log::debug!("memoizing {:?} as {:?}", text, v);
                Ok(Resolution::Memoize(v))
            }
            None => Ok(Resolution::NotParsed)
        }
    }
    fn name(&self) -> &'static str {
        "lazy"
    }
}

/// Reads words (runs of characters accepted by `continues`) whole,
/// even if they start with a registered key: over the keys "if" and
/// "in", `inside` is read as one fresh value. A run is not started at
/// a character that begins a key, so `in if` still reads two keys.
/// Without any key matched, the run also stops before such a
/// character: `xif` reads `x`, then `if`.
pub struct Greedy<F> {
    continues: F,
}

impl<F> Greedy<F> {
    pub fn new(continues: F) -> Greedy<F> {
        Greedy { continues }
    }
}

impl<F: Fn(&char) -> bool> MatchPolicy<char, KString> for Greedy<F> {
    fn on_success(&self, s: &mut dyn Feed<char>, walk: &Walk<char>,
                  trie: &Trie<char, KString>, value: KString)
                  -> Result<Resolution<KString>, ParseError> {
        if walk.at_end || trie.route(s.peek()).is_some() {
            return Ok(Resolution::Found(value))
        }
        let run = s.take_while(&self.continues);
        if run.is_empty() {
            return Ok(Resolution::Found(value))
        }
        let text: String = walk.path.iter().chain(&run).collect();
        Ok(Resolution::Fresh(KString::from_string(text)))
    }

    fn on_fail(&self, s: &mut dyn Feed<char>, walk: &Walk<char>, trie: &Trie<char, KString>)
               -> Result<Resolution<KString>, ParseError> {
        let run = if walk.at_end {
            Vec::new()
        } else {
            s.take_while(|c| trie.route(c).is_none() && (self.continues)(c))
        };
        if walk.path.is_empty() && run.is_empty() {
            return Ok(Resolution::NotParsed)
        }
        let text: String = walk.path.iter().chain(&run).collect();
        Ok(Resolution::Fresh(KString::from_string(text)))
    }

    fn show_unregistered(&self, s: &mut dyn Output<char>, value: &KString) -> ShowResult {
        for c in value.chars() {
            s.put(c);
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "greedy"
    }
}


/// The paths registered for each value, latest last. Paths
/// overwritten by another value are dropped.
#[derive(Debug, Clone)]
struct BackIndex<K, V> {
    entries: Vec<(V, Vec<Vec<K>>)>,
}

impl<K: PartialEq, V: PartialEq> BackIndex<K, V> {
    fn new() -> BackIndex<K, V> {
        BackIndex { entries: Vec::new() }
    }

    fn register(&mut self, value: V, path: Vec<K>) {
        match self.entries.iter_mut().find(|(v, _)| *v == value) {
            Some((_, paths)) => {
                paths.retain(|p| *p != path);
                paths.push(path);
            }
            None => self.entries.push((value, vec![path]))
        }
    }

    fn unregister(&mut self, value: &V, path: &[K]) {
        if let Some((_, paths)) = self.entries.iter_mut().find(|(v, _)| v == value) {
            paths.retain(|p| p.as_slice() != path);
        }
        self.entries.retain(|(_, paths)| !paths.is_empty());
    }

    fn path_of(&self, value: &V) -> Option<&Vec<K>> {
        self.entries.iter()
            .find(|(v, _)| v == value)
            .and_then(|(_, paths)| paths.last())
    }

    /// The number of distinct values.
    fn len(&self) -> usize {
        self.entries.len()
    }
}


pub struct TriePattern<K: Hash + Eq, V, M = Exact> {
    trie: RefCell<Trie<K, V>>,
    back: RefCell<BackIndex<K, V>>,
    policy: M,
}

impl<K: Hash + Eq + Clone, V: Clone + PartialEq> TriePattern<K, V, Exact> {
    pub fn new() -> TriePattern<K, V, Exact> {
        TriePattern::with_policy(Exact)
    }
}

impl<K: Hash + Eq + Clone, V: Clone + PartialEq> Default for TriePattern<K, V, Exact> {
    fn default() -> Self {
        TriePattern::new()
    }
}

impl<F: Fn(&str) -> Option<V>, V: Clone + PartialEq> TriePattern<char, V, Lazy<F>> {
    pub fn lazy(classify: F) -> TriePattern<char, V, Lazy<F>> {
        TriePattern::with_policy(Lazy::new(classify))
    }
}

impl<F: Fn(&char) -> bool> TriePattern<char, KString, Greedy<F>> {
    pub fn greedy(continues: F) -> TriePattern<char, KString, Greedy<F>> {
        TriePattern::with_policy(Greedy::new(continues))
    }
}

impl<K: Hash + Eq + Clone, V: Clone + PartialEq, M> TriePattern<K, V, M> {
    pub fn with_policy(policy: M) -> TriePattern<K, V, M> {
        TriePattern {
            trie: RefCell::new(Trie::new()),
            back: RefCell::new(BackIndex::new()),
            policy,
        }
    }

    /// Registers `value` at `path`; `show` writes the path registered
    /// last for a value that is still mapped to it.
    pub fn insert(&self, path: impl IntoIterator<Item = K>, value: V) {
        let path: Vec<K> = path.into_iter().collect();
        let old = self.trie.borrow_mut().insert(path.clone(), value.clone());
        let mut back = self.back.borrow_mut();
        if let Some(old) = old {
            back.unregister(&old, &path);
        }
        back.register(value, path);
    }

    pub fn merge<P: IntoIterator<Item = K>>(&self, entries: impl IntoIterator<Item = (P, V)>) {
        for (path, value) in entries {
            self.insert(path, value);
        }
    }

    /// The registered path of `value`.
    pub fn path_of(&self, value: &V) -> Option<Vec<K>> {
        self.back.borrow().path_of(value).cloned()
    }

    pub fn trie(&self) -> Ref<'_, Trie<K, V>> {
        self.trie.borrow()
    }

    pub fn policy(&self) -> &M {
        &self.policy
    }
}

impl<V: Clone + PartialEq, M> TriePattern<char, V, M> {
    pub fn insert_str(&self, key: &str, value: V) {
        self.insert(key.chars(), value)
    }

    pub fn get_str(&self, key: &str) -> Option<V> {
        let path: Vec<char> = key.chars().collect();
        let trie = self.trie.borrow();
        trie.get(&path).cloned()
    }

    /// Registers all case spellings of `key`; `show` writes `key` as
    /// given.
    pub fn insert_nocase(&self, key: &str, value: V) {
        let replaced = self.trie.borrow_mut().insert_nocase(key, value.clone());
        let mut back = self.back.borrow_mut();
        for (path, old) in replaced {
            back.unregister(&old, &path);
        }
        back.register(value, key.chars().collect());
    }
}

impl<K, V, M> Pattern for TriePattern<K, V, M>
    where K: Hash + Eq + Clone,
          V: Clone + PartialEq,
          M: MatchPolicy<K, V>
{
    type In = K;
    type Out = V;

    fn read(&self, s: &mut dyn Feed<K>) -> ReadResult<V> {
        let (walk, resolution) = {
            let trie = self.trie.borrow();
            let mut node: &Trie<K, V> = &trie;
            let mut walk = Walk { path: Vec::new(), at_end: false };
            loop {
                let next = match node.routes.get(s.peek()) {
                    Some(next) => next,
                    None => break
                };
                match s.consume() {
                    Ok(k) => walk.path.push(k),
                    Err(End) => {
                        walk.at_end = true;
                        break
                    }
                }
                node = next;
            }
            let resolution = match node.value.clone() {
                Some(v) => self.policy.on_success(s, &walk, &trie, v)?,
                None => self.policy.on_fail(s, &walk, &trie)?
            };
            (walk, resolution)
        };
        match resolution {
            Resolution::NotParsed => Ok(None),
            Resolution::Found(v) | Resolution::Fresh(v) => Ok(Some(v)),
            Resolution::Memoize(v) => {
                self.insert(walk.path, v.clone());
                Ok(Some(v))
            }
        }
    }
    fn show(&self, s: &mut dyn Output<K>, value: &V) -> ShowResult {
        match self.path_of(value) {
            Some(path) => {
                for k in path {
                    s.put(k);
                }
                Ok(())
            }
            None => self.policy.show_unregistered(s, value)
        }
    }
    fn describe(&self, f: &mut Formatter<'_>)
                -> Result<(), std::fmt::Error> {
        f.write_fmt(format_args!("(trie: {} {} values)",
                                 self.back.borrow().len(),
                                 self.policy.name()))
    }
}


/// A dictionary of words and their translations, readable both ways:
/// the pattern reads keys to values, [back](DictTrie::back) values to
/// keys.
pub struct DictTrie {
    forward: TriePattern<char, KString>,
    back: TriePattern<char, KString>,
}

impl Default for DictTrie {
    fn default() -> Self {
        DictTrie::new()
    }
}

impl DictTrie {
    pub fn new() -> DictTrie {
        DictTrie { forward: TriePattern::new(), back: TriePattern::new() }
    }

    pub fn insert(&self, key: &str, value: &str) {
        self.forward.insert_str(key, KString::from_ref(value));
        self.back.insert_str(value, KString::from_ref(key));
    }

    pub fn back(&self) -> &TriePattern<char, KString> {
        &self.back
    }
}

impl Pattern for DictTrie {
    type In = char;
    type Out = KString;

    fn read(&self, s: &mut dyn Feed<char>) -> ReadResult<KString> {
        self.forward.read(s)
    }
    fn show(&self, s: &mut dyn Output<char>, value: &KString) -> ShowResult {
        self.forward.show(s, value)
    }
    fn describe(&self, f: &mut Formatter<'_>)
                -> Result<(), std::fmt::Error> {
        f.write_str("dict")?;
        self.forward.describe(f)
    }
}
