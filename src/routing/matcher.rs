//! Route matching module
//!
//! Maps `(method, path)` onto the gateway's fixed route table. Path parameters
//! are handed over raw; handlers validate them so a bad id is a 400, not a 404.

use hyper::Method;

/// A matched gateway route with its path parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint<'a> {
    /// `GET /movies/search/{title}`
    SearchMovies { title: &'a str },
    /// `GET /movies/data/{id}`
    MovieData { id: &'a str },
    /// `GET /movies/reviews/{id}`
    MovieReviews { id: &'a str },
    /// `GET /movies/streaming/{id}`
    StreamingById { id: &'a str },
    /// `GET /streaming/search/{title}`
    StreamingSearch { title: &'a str },
    /// `GET /posters/{id}`
    Poster { id: &'a str },
    /// `GET /posters/uploaded/{id}`
    UploadedPoster { id: &'a str },
    /// `POST /posters/add/{id}`
    UploadPoster { id: &'a str },
}

/// Outcome of matching a request against the route table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteMatch<'a> {
    Found(Endpoint<'a>),
    /// Path is known but not for this method; carries the `Allow` value
    MethodNotAllowed(&'static str),
    NotFound,
}

/// Match a request path and method
pub fn match_route<'a>(method: &Method, path: &'a str) -> RouteMatch<'a> {
    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();

    let (allow, endpoint) = match *segments.as_slice() {
        ["movies", "search", title] => ("GET", Endpoint::SearchMovies { title }),
        ["movies", "data", id] => ("GET", Endpoint::MovieData { id }),
        ["movies", "reviews", id] => ("GET", Endpoint::MovieReviews { id }),
        ["movies", "streaming", id] => ("GET", Endpoint::StreamingById { id }),
        ["streaming", "search", title] => ("GET", Endpoint::StreamingSearch { title }),
        ["posters", "add", id] => ("POST", Endpoint::UploadPoster { id }),
        ["posters", "uploaded", id] => ("GET", Endpoint::UploadedPoster { id }),
        ["posters", id] => ("GET", Endpoint::Poster { id }),
        _ => return RouteMatch::NotFound,
    };

    if method.as_str() == allow {
        RouteMatch::Found(endpoint)
    } else {
        RouteMatch::MethodNotAllowed(allow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_routes() {
        assert_eq!(
            match_route(&Method::GET, "/movies/search/Alien"),
            RouteMatch::Found(Endpoint::SearchMovies { title: "Alien" })
        );
        assert_eq!(
            match_route(&Method::GET, "/movies/data/tt0078748"),
            RouteMatch::Found(Endpoint::MovieData { id: "tt0078748" })
        );
        assert_eq!(
            match_route(&Method::GET, "/movies/reviews/tt0078748"),
            RouteMatch::Found(Endpoint::MovieReviews { id: "tt0078748" })
        );
        assert_eq!(
            match_route(&Method::GET, "/movies/streaming/tt0078748"),
            RouteMatch::Found(Endpoint::StreamingById { id: "tt0078748" })
        );
        assert_eq!(
            match_route(&Method::GET, "/streaming/search/Alien"),
            RouteMatch::Found(Endpoint::StreamingSearch { title: "Alien" })
        );
        assert_eq!(
            match_route(&Method::GET, "/posters/tt0078748"),
            RouteMatch::Found(Endpoint::Poster { id: "tt0078748" })
        );
        assert_eq!(
            match_route(&Method::GET, "/posters/uploaded/tt0078748"),
            RouteMatch::Found(Endpoint::UploadedPoster { id: "tt0078748" })
        );
    }

    #[test]
    fn test_upload_route_is_post_only() {
        assert_eq!(
            match_route(&Method::POST, "/posters/add/tt0078748"),
            RouteMatch::Found(Endpoint::UploadPoster { id: "tt0078748" })
        );
        assert_eq!(
            match_route(&Method::GET, "/posters/add/tt0078748"),
            RouteMatch::MethodNotAllowed("POST")
        );
        assert_eq!(
            match_route(&Method::POST, "/posters/tt0078748"),
            RouteMatch::MethodNotAllowed("GET")
        );
    }

    #[test]
    fn test_unknown_paths() {
        assert_eq!(match_route(&Method::GET, "/"), RouteMatch::NotFound);
        assert_eq!(match_route(&Method::GET, "/movies"), RouteMatch::NotFound);
        assert_eq!(
            match_route(&Method::GET, "/movies/data/tt0078748/extra"),
            RouteMatch::NotFound
        );
        assert_eq!(match_route(&Method::GET, "/posters"), RouteMatch::NotFound);
    }

    #[test]
    fn test_empty_parameter_still_matches() {
        // Rejected later as an invalid id rather than a missing route
        assert_eq!(
            match_route(&Method::GET, "/movies/data/"),
            RouteMatch::Found(Endpoint::MovieData { id: "" })
        );
    }
}
