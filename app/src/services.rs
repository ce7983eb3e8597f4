//! Request/response seams used by the command line tool.

use anyhow::Result;

pub trait Request {
    type Resp;
}

/// Read-only requests.
pub trait Queryable<Req>
where
    Req: Request,
{
    fn query(&self, req: Req) -> Result<Req::Resp>;
}

/// Requests that change stored state.
pub trait Commandable<Req>
where
    Req: Request,
{
    fn execute(&self, req: Req) -> Result<Req::Resp>;
}
