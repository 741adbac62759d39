//! The evaluation context threaded through every query function call:
//! the open datastore handle plus the `STARTTIME`/`ENDTIME` window the
//! original bound as free variables in the query's execution globals
//! (`aw_query/query2.py`'s `namespace["STARTTIME"]`/`["ENDTIME"]`).

use aw_datastore::Datastore;
use chrono::{DateTime, Utc};

pub struct Namespace<'a> {
    pub datastore: &'a Datastore,
    pub starttime: DateTime<Utc>,
    pub endtime: DateTime<Utc>,
}

impl<'a> Namespace<'a> {
    pub fn new(datastore: &'a Datastore, starttime: DateTime<Utc>, endtime: DateTime<Utc>) -> Self {
        Namespace { datastore, starttime, endtime }
    }
}
