// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Accumulating items into a result while reading (fold), and taking
//! a result apart into items again for showing (unfold). Repetition
//! patterns ([Until](crate::surd::Until),
//! [Repeat](crate::surd::Repeat)) are parametrized with a fold.

use crate::error::{FoldError, ShowError};
use num::{BigInt, Signed, Zero};
use std::collections::HashMap;
use std::hash::Hash;
use std::marker::PhantomData;
use std::rc::Rc;

pub trait Reducer<T> {
    type Output;
    fn accept(&mut self, value: T) -> Result<(), FoldError>;
    fn finish(self) -> Self::Output;
}

pub trait Fold<T> {
    type Output;
    type Reducer: Reducer<T, Output = Self::Output>;

    fn reducer(&self) -> Self::Reducer;

    /// The items that fold into `value`. Folds that can't be inverted
    /// keep this default, and the patterns using them can't `show`.
    fn unfold(&self, _value: &Self::Output) -> Result<Vec<T>, ShowError> {
        Err(ShowError::Unsupported("unfold"))
    }

    /// Attach an inverse to a fold that has none (or a different one).
    fn with_unfold<U>(self, unfold: U) -> WithUnfold<Self, U>
        where Self: Sized,
              U: Fn(&Self::Output) -> Vec<T>
    {
        WithUnfold { fold: self, unfold }
    }
}

/// Fold all of `items`.
pub fn fold_all<T, F: Fold<T>>(items: impl IntoIterator<Item = T>, fold: &F)
                               -> Result<F::Output, FoldError> {
    let mut reducer = fold.reducer();
    for item in items {
        reducer.accept(item)?;
    }
    Ok(reducer.finish())
}


pub struct WithUnfold<F, U> {
    fold: F,
    unfold: U,
}

impl<T, F, U> Fold<T> for WithUnfold<F, U>
    where F: Fold<T>,
          U: Fn(&F::Output) -> Vec<T>
{
    type Output = F::Output;
    type Reducer = F::Reducer;

    fn reducer(&self) -> F::Reducer {
        self.fold.reducer()
    }
    fn unfold(&self, value: &F::Output) -> Result<Vec<T>, ShowError> {
        Ok((self.unfold)(value))
    }
}


pub struct AsList<T>(PhantomData<fn(T)>);

pub fn as_list<T>() -> AsList<T> {
    AsList(PhantomData)
}

pub struct ListReducer<T>(Vec<T>);

impl<T> Reducer<T> for ListReducer<T> {
    type Output = Vec<T>;
    fn accept(&mut self, value: T) -> Result<(), FoldError> {
        self.0.push(value);
        Ok(())
    }
    fn finish(self) -> Vec<T> {
        self.0
    }
}

impl<T: Clone> Fold<T> for AsList<T> {
    type Output = Vec<T>;
    type Reducer = ListReducer<T>;
    fn reducer(&self) -> ListReducer<T> {
        ListReducer(Vec::new())
    }
    fn unfold(&self, value: &Vec<T>) -> Result<Vec<T>, ShowError> {
        Ok(value.clone())
    }
}


pub struct AsString;

pub fn as_string() -> AsString {
    AsString
}

pub struct StringReducer(String);

impl Reducer<char> for StringReducer {
    type Output = String;
    fn accept(&mut self, value: char) -> Result<(), FoldError> {
        self.0.push(value);
        Ok(())
    }
    fn finish(self) -> String {
        self.0
    }
}

impl Reducer<String> for StringReducer {
    type Output = String;
    fn accept(&mut self, value: String) -> Result<(), FoldError> {
        self.0.push_str(&value);
        Ok(())
    }
    fn finish(self) -> String {
        self.0
    }
}

impl Fold<char> for AsString {
    type Output = String;
    type Reducer = StringReducer;
    fn reducer(&self) -> StringReducer {
        StringReducer(String::new())
    }
    fn unfold(&self, value: &String) -> Result<Vec<char>, ShowError> {
        Ok(value.chars().collect())
    }
}

/// Concatenation of strings; the parts are lost, thus no unfold.
pub struct JoinAsString;

pub fn join_as_string() -> JoinAsString {
    JoinAsString
}

impl Fold<String> for JoinAsString {
    type Output = String;
    type Reducer = StringReducer;
    fn reducer(&self) -> StringReducer {
        StringReducer(String::new())
    }
}


pub struct AsCount;

pub fn as_count() -> AsCount {
    AsCount
}

pub struct CountReducer(usize);

impl<T> Reducer<T> for CountReducer {
    type Output = usize;
    fn accept(&mut self, _value: T) -> Result<(), FoldError> {
        self.0 += 1;
        Ok(())
    }
    fn finish(self) -> usize {
        self.0
    }
}

impl<T> Fold<T> for AsCount {
    type Output = usize;
    type Reducer = CountReducer;
    fn reducer(&self) -> CountReducer {
        CountReducer(0)
    }
}


pub struct AsMap<K, V>(PhantomData<fn(K, V)>);

pub fn as_map<K, V>() -> AsMap<K, V> {
    AsMap(PhantomData)
}

pub struct MapReducer<K, V>(HashMap<K, V>);

impl<K: Hash + Eq, V> Reducer<(K, V)> for MapReducer<K, V> {
    type Output = HashMap<K, V>;
    fn accept(&mut self, (k, v): (K, V)) -> Result<(), FoldError> {
        self.0.insert(k, v);
        Ok(())
    }
    fn finish(self) -> HashMap<K, V> {
        self.0
    }
}

impl<K, V> Fold<(K, V)> for AsMap<K, V>
    where K: Hash + Eq + Clone,
          V: Clone
{
    type Output = HashMap<K, V>;
    type Reducer = MapReducer<K, V>;
    fn reducer(&self) -> MapReducer<K, V> {
        MapReducer(HashMap::new())
    }
    // Entry order is whatever the map iterates in.
    fn unfold(&self, value: &HashMap<K, V>) -> Result<Vec<(K, V)>, ShowError> {
        Ok(value.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }
}


/// Digits (as numbers below `radix`) into an `i64`.
pub struct AsInt {
    radix: u32,
}

pub fn as_int(radix: u32) -> AsInt {
    AsInt { radix }
}

pub struct IntReducer {
    radix: u32,
    n: i64,
}

impl Reducer<u32> for IntReducer {
    type Output = i64;
    fn accept(&mut self, digit: u32) -> Result<(), FoldError> {
        self.n = self.n.checked_mul(self.radix as i64)
            .and_then(|n| n.checked_add(digit as i64))
            .ok_or_else(|| FoldError(format!("integer overflow after {}", self.n)))?;
        Ok(())
    }
    fn finish(self) -> i64 {
        self.n
    }
}

fn digits_of(s: &str, radix: u32) -> Vec<u32> {
    s.chars().filter_map(|c| c.to_digit(radix)).collect()
}

impl Fold<u32> for AsInt {
    type Output = i64;
    type Reducer = IntReducer;
    fn reducer(&self) -> IntReducer {
        IntReducer { radix: self.radix, n: 0 }
    }
    fn unfold(&self, value: &i64) -> Result<Vec<u32>, ShowError> {
        if *value < 0 {
            return Err(ShowError::Unsupported("unfold of negative integer"))
        }
        let s = BigInt::from(*value).to_str_radix(self.radix);
        Ok(digits_of(&s, self.radix))
    }
}

/// Decimal digits after the point, added to an integral part read
/// before: `as_double(3)` folds `2, 5` into 3.25. No unfold.
pub struct AsDouble {
    integral: i64,
}

pub fn as_double(integral: i64) -> AsDouble {
    AsDouble { integral }
}

pub struct DoubleReducer {
    integral: i64,
    numer: u64,
    denom: u64,
}

impl Reducer<u32> for DoubleReducer {
    type Output = f64;
    fn accept(&mut self, digit: u32) -> Result<(), FoldError> {
        let (numer, denom) = self.numer.checked_mul(10)
            .and_then(|n| n.checked_add(digit as u64))
            .zip(self.denom.checked_mul(10))
            .ok_or_else(|| FoldError("too many fraction digits".into()))?;
        self.numer = numer;
        self.denom = denom;
        Ok(())
    }
    fn finish(self) -> f64 {
        let fraction = self.numer as f64 / self.denom as f64;
        if self.integral < 0 {
            self.integral as f64 - fraction
        } else {
            self.integral as f64 + fraction
        }
    }
}

impl Fold<u32> for AsDouble {
    type Output = f64;
    type Reducer = DoubleReducer;
    fn reducer(&self) -> DoubleReducer {
        DoubleReducer { integral: self.integral, numer: 0, denom: 1 }
    }
}

/// Digits into an arbitrary size integer, never overflowing.
pub struct AsBigInt {
    radix: u32,
}

pub fn as_big_int(radix: u32) -> AsBigInt {
    AsBigInt { radix }
}

pub struct BigIntReducer {
    radix: u32,
    n: BigInt,
}

impl Reducer<u32> for BigIntReducer {
    type Output = BigInt;
    fn accept(&mut self, digit: u32) -> Result<(), FoldError> {
        self.n = &self.n * self.radix + digit;
        Ok(())
    }
    fn finish(self) -> BigInt {
        self.n
    }
}

impl Fold<u32> for AsBigInt {
    type Output = BigInt;
    type Reducer = BigIntReducer;
    fn reducer(&self) -> BigIntReducer {
        BigIntReducer { radix: self.radix, n: BigInt::zero() }
    }
    fn unfold(&self, value: &BigInt) -> Result<Vec<u32>, ShowError> {
        if value.is_negative() {
            return Err(ShowError::Unsupported("unfold of negative integer"))
        }
        Ok(digits_of(&value.to_str_radix(self.radix), self.radix))
    }
}


/// Fold by repeatedly appending to `initial`, like
/// `join_fold(0, |n, x| n + x)`.
pub struct JoinFold<A, F> {
    initial: A,
    append: Rc<F>,
}

pub fn join_fold<A, F>(initial: A, append: F) -> JoinFold<A, F> {
    JoinFold { initial, append: Rc::new(append) }
}

pub struct JoinReducer<A, F> {
    // Only None while `append` runs.
    base: Option<A>,
    append: Rc<F>,
}

impl<T, A, F: Fn(A, T) -> A> Reducer<T> for JoinReducer<A, F> {
    type Output = A;
    fn accept(&mut self, value: T) -> Result<(), FoldError> {
        if let Some(base) = self.base.take() {
            self.base = Some((self.append)(base, value));
        }
        Ok(())
    }
    fn finish(self) -> A {
        match self.base {
            Some(base) => base,
            None => unreachable!("join_fold: base lost during append")
        }
    }
}

impl<T, A: Clone, F: Fn(A, T) -> A> Fold<T> for JoinFold<A, F> {
    type Output = A;
    type Reducer = JoinReducer<A, F>;
    fn reducer(&self) -> JoinReducer<A, F> {
        JoinReducer { base: Some(self.initial.clone()), append: self.append.clone() }
    }
}
