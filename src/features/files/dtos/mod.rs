mod file_dto;

pub use file_dto::{
    DeleteFileResponseDto, FileDetailResponseDto, FileListQuery, FileListResponseDto,
    FileResponseDto, UpdateFileDto, UploadFileDto,
};
