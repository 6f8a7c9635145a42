/*
 * result.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Corriere, an asynchronous HTTP request library.
 *
 * Corriere is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Corriere is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Corriere.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Two-case result value returned by the `*_result` and `*_response` awaiters.
//!
//! Unlike `std::result::Result` there is no `unwrap`: callers reach the payload through `fold`,
//! which makes them say what happens on failure too.

/// Success or failure of a request, as data rather than control flow.
#[must_use = "a FuelResult may be a Failure, which should be handled"]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FuelResult<T, E> {
    Success(T),
    Failure(E),
}

impl<T, E> FuelResult<T, E> {
    pub fn success(value: T) -> Self {
        FuelResult::Success(value)
    }

    pub fn failure(error: E) -> Self {
        FuelResult::Failure(error)
    }

    /// Apply `success` to the value or `failure` to the error and return what it produces.
    pub fn fold<R>(self, success: impl FnOnce(T) -> R, failure: impl FnOnce(E) -> R) -> R {
        match self {
            FuelResult::Success(value) => success(value),
            FuelResult::Failure(error) => failure(error),
        }
    }

    /// Borrowing view, so the same result can be folded any number of times.
    pub fn as_ref(&self) -> FuelResult<&T, &E> {
        match self {
            FuelResult::Success(value) => FuelResult::Success(value),
            FuelResult::Failure(error) => FuelResult::Failure(error),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FuelResult::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, FuelResult::Failure(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FuelResult<U, E> {
        match self {
            FuelResult::Success(value) => FuelResult::Success(f(value)),
            FuelResult::Failure(error) => FuelResult::Failure(error),
        }
    }

    pub fn map_failure<F>(self, f: impl FnOnce(E) -> F) -> FuelResult<T, F> {
        match self {
            FuelResult::Success(value) => FuelResult::Success(value),
            FuelResult::Failure(error) => FuelResult::Failure(f(error)),
        }
    }

    /// Chain a step that may itself fail (e.g. deserializing a successful payload).
    pub fn and_then<U>(self, f: impl FnOnce(T) -> FuelResult<U, E>) -> FuelResult<U, E> {
        match self {
            FuelResult::Success(value) => f(value),
            FuelResult::Failure(error) => FuelResult::Failure(error),
        }
    }

    /// Convert into a standard `Result` so the failure can be propagated with `?`.
    pub fn into_result(self) -> Result<T, E> {
        match self {
            FuelResult::Success(value) => Ok(value),
            FuelResult::Failure(error) => Err(error),
        }
    }
}

impl<T, E> From<Result<T, E>> for FuelResult<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => FuelResult::Success(value),
            Err(error) => FuelResult::Failure(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_picks_the_matching_arm() {
        let ok: FuelResult<u32, String> = FuelResult::success(7);
        assert_eq!(ok.fold(|v| v * 2, |_| 0), 14);

        let err: FuelResult<u32, String> = FuelResult::failure("boom".to_string());
        assert_eq!(err.fold(|_| String::new(), |e| e), "boom");
    }

    #[test]
    fn folding_by_reference_is_repeatable() {
        let result: FuelResult<Vec<u8>, String> = FuelResult::Failure("HTTP Exception 404".into());
        let first = result.as_ref().fold(|_| "success", |_| "failure");
        let second = result.as_ref().fold(|_| "success", |_| "failure");
        assert_eq!(first, "failure");
        assert_eq!(first, second);
        assert_eq!(result, FuelResult::Failure("HTTP Exception 404".into()));
    }

    #[test]
    fn and_then_short_circuits_on_failure() {
        let mut called = false;
        let result: FuelResult<u32, &str> = FuelResult::Failure("network");
        let chained = result.and_then(|v| {
            called = true;
            FuelResult::Success(v + 1)
        });
        assert!(!called);
        assert_eq!(chained, FuelResult::Failure("network"));

        let parsed: FuelResult<u32, &str> = FuelResult::Success("42").and_then(|s: &str| {
            s.parse::<u32>().map_err(|_| "parse").into()
        });
        assert_eq!(parsed, FuelResult::Success(42));
    }

    #[test]
    fn converts_to_and_from_std_result() {
        let r: FuelResult<u8, &str> = Ok::<u8, &str>(1).into();
        assert!(r.is_success());
        assert_eq!(r.into_result(), Ok(1));

        let r: FuelResult<u8, &str> = Err::<u8, &str>("x").into();
        assert!(r.is_failure());
        assert_eq!(r.map(|v| v + 1).map_failure(|e| e.len()).into_result(), Err(1));
    }
}
